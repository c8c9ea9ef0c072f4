//! In-memory doubles for the collaborator seams

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use duelgrid_registrar_core::{ChannelBinder, ChannelId};

use super::{AccountId, Authenticator, Profile, ProfileStore, ProfileUpdate};
use crate::errors::Result;
use crate::session::SessionClient;

/// Authenticator over a fixed identity/secret table
#[derive(Default)]
pub struct StaticAuthenticator {
    accounts: DashMap<String, String>,
}

impl StaticAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `secret` for `identity`
    pub fn allow(&self, identity: &str, secret: &str) {
        self.accounts.insert(identity.to_string(), secret.to_string());
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, identity: &str, secret: &str) -> Option<AccountId> {
        match self.accounts.get(identity) {
            Some(expected) if expected.value() == secret => {
                Some(AccountId(format!("acct:{}", identity)))
            }
            _ => None,
        }
    }
}

/// Profile store over a DashMap
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: DashMap<AccountId, Profile>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn load(&self, account_id: &AccountId) -> Result<Option<Profile>> {
        Ok(self.profiles.get(account_id).map(|p| p.clone()))
    }

    async fn create(&self, profile: Profile) -> Result<()> {
        self.profiles.insert(profile.account_id.clone(), profile);
        Ok(())
    }

    async fn save(&self, account_id: &AccountId, update: ProfileUpdate) -> Result<()> {
        if let Some(mut profile) = self.profiles.get_mut(account_id) {
            if let Some(display_name) = update.display_name {
                profile.display_name = display_name;
            }
        }
        Ok(())
    }
}

/// Channel binder that always succeeds with sequential non-zero ids
pub struct LoopbackBinder {
    next_id: AtomicU64,
}

impl LoopbackBinder {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl ChannelBinder for LoopbackBinder {
    type Handle = SessionClient;

    async fn bind(&self, _handle: &SessionClient, _capability: &str) -> anyhow::Result<ChannelId> {
        Ok(ChannelId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }
}

/// Channel binder that always fails; for teardown tests
pub struct FailingBinder;

#[async_trait]
impl ChannelBinder for FailingBinder {
    type Handle = SessionClient;

    async fn bind(&self, _handle: &SessionClient, _capability: &str) -> anyhow::Result<ChannelId> {
        anyhow::bail!("transport rejected the bind")
    }
}
