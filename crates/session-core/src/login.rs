//! Login flow
//!
//! Composes the collaborator seams into the login sequence: authenticate,
//! load or create the profile, create the session, register the identity
//! cluster-wide, and surface the bound channel. Every failure path tears
//! down whatever partial state it left behind, so a rejected login never
//! leaks an orphaned session or registration entry.

use std::sync::Arc;
use tracing::{debug, info, warn};

use duelgrid_registrar_core::{ChannelBinder, ChannelId, Registrar, SessionRef};

use crate::api::types::{CreateSessionParams, SessionId};
use crate::auth::{Authenticator, Profile, ProfileStore};
use crate::errors::{Result, SessionError};
use crate::manager::DirectoryClient;
use crate::session::SessionClient;

/// Successful login: a live session with the identity reserved and the
/// client channel bound
#[derive(Clone, Debug)]
pub struct LoginGrant {
    pub session: SessionClient,
    pub channel_id: ChannelId,
    pub profile: Profile,
}

/// Drives the login sequence for one node
pub struct LoginService<B: ChannelBinder<Handle = SessionClient>> {
    authenticator: Arc<dyn Authenticator>,
    profiles: Arc<dyn ProfileStore>,
    directory: DirectoryClient,
    registrar: Registrar<B>,
    node_name: String,
}

impl<B: ChannelBinder<Handle = SessionClient>> LoginService<B> {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        profiles: Arc<dyn ProfileStore>,
        directory: DirectoryClient,
        registrar: Registrar<B>,
        node_name: impl Into<String>,
    ) -> Self {
        Self {
            authenticator,
            profiles,
            directory,
            registrar,
            node_name: node_name.into(),
        }
    }

    /// Log `identity` in and give it a fresh session
    pub async fn login(
        &self,
        identity: &str,
        secret: &str,
        params: CreateSessionParams,
    ) -> Result<LoginGrant> {
        let account_id = self
            .authenticator
            .authenticate(identity, secret)
            .await
            .ok_or(SessionError::AuthenticationFailed)?;
        debug!("Authenticated {} as {}", identity, account_id);

        let profile = match self.profiles.load(&account_id).await? {
            Some(profile) => profile,
            None => {
                let profile = Profile {
                    account_id: account_id.clone(),
                    identity: identity.to_string(),
                    display_name: identity.to_string(),
                };
                self.profiles.create(profile.clone()).await?;
                profile
            }
        };

        let session_id = SessionId::random();
        let session = self.directory.create_session(session_id, params).await?;

        let entry = SessionRef::new(&self.node_name, session_id.0);
        match self.registrar.register(identity, entry, &session).await {
            Ok(grant) => {
                info!(
                    "Login for {} complete: {} on channel {}",
                    identity, session_id, grant.channel_id.0
                );
                Ok(LoginGrant {
                    session,
                    channel_id: grant.channel_id,
                    profile,
                })
            }
            Err(e) => {
                // The session actor was already spawned; tear it down so a
                // failed login leaves no orphan
                warn!("Login for {} failed at registration: {}", identity, e);
                let _ = self.directory.remove_session(session_id).await;
                Err(SessionError::Registration(e))
            }
        }
    }
}
