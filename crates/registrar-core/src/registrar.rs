//! Login-time session registration with bounded optimistic retry

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::{RegistrarError, Result};
use crate::table::{InsertOutcome, RegistrationTable, SessionRef};

/// Identifier of a bound client channel; non-zero is success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelId(pub u64);

/// Channel binding seam
///
/// Binds a participant-facing handle to the inbound connection channel once
/// the identity is reserved. The handle type is the caller's; the registrar
/// only needs to pass it through.
#[async_trait::async_trait]
pub trait ChannelBinder: Send + Sync {
    type Handle: Send + Sync;

    async fn bind(&self, handle: &Self::Handle, capability: &str) -> anyhow::Result<ChannelId>;
}

/// Configuration for the registration protocol
#[derive(Debug, Clone)]
pub struct RegistrarConfig {
    /// Conditional-insert attempts before giving up
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub retry_delay: Duration,
    /// Capability string passed to the channel binder
    pub capability: String,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        RegistrarConfig {
            max_attempts: 10,
            retry_delay: Duration::from_millis(200),
            capability: "game-session".to_string(),
        }
    }
}

impl RegistrarConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

/// Successful registration: the identity is reserved and the handle is bound
#[derive(Debug, Clone)]
pub struct RegistrationGrant {
    pub channel_id: ChannelId,
    pub entry: SessionRef,
}

/// Registration protocol driver
///
/// Retries the conditional insert against a table whose stale entries free
/// up asynchronously. Only the insert is retried; the login sequence around
/// it is not idempotent and the caller owns teardown of anything it spawned
/// before calling `register`.
pub struct Registrar<B: ChannelBinder> {
    table: Arc<dyn RegistrationTable>,
    binder: B,
    config: RegistrarConfig,
}

impl<B: ChannelBinder> Registrar<B> {
    pub fn new(table: Arc<dyn RegistrationTable>, binder: B) -> Self {
        Self::with_config(table, binder, RegistrarConfig::default())
    }

    pub fn with_config(table: Arc<dyn RegistrationTable>, binder: B, config: RegistrarConfig) -> Self {
        Self {
            table,
            binder,
            config,
        }
    }

    /// Reserve `identity` cluster-wide, then bind `handle` to the inbound
    /// connection channel
    pub async fn register(
        &self,
        identity: &str,
        entry: SessionRef,
        handle: &B::Handle,
    ) -> Result<RegistrationGrant> {
        for attempt in 1..=self.config.max_attempts {
            match self.table.try_insert(identity, entry.clone()).await? {
                InsertOutcome::Inserted => {
                    debug!("Registered {} -> {} on attempt {}", identity, entry, attempt);
                    return self.bind_channel(identity, entry, handle).await;
                }
                InsertOutcome::Occupied(existing) => {
                    debug!(
                        "Registration attempt {}/{} for {} blocked by live entry {}",
                        attempt, self.config.max_attempts, identity, existing
                    );
                    if attempt < self.config.max_attempts {
                        sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        warn!(
            "Registration for {} exhausted {} attempts",
            identity, self.config.max_attempts
        );
        Err(RegistrarError::AlreadyConnected)
    }

    async fn bind_channel(
        &self,
        identity: &str,
        entry: SessionRef,
        handle: &B::Handle,
    ) -> Result<RegistrationGrant> {
        match self.binder.bind(handle, &self.config.capability).await {
            Ok(channel_id) if channel_id.0 != 0 => {
                info!("Bound channel {} for {}", channel_id.0, identity);
                Ok(RegistrationGrant { channel_id, entry })
            }
            Ok(_) => {
                error!("Channel bind for {} returned a zero channel id", identity);
                let _ = self.table.remove(identity, &entry).await;
                Err(RegistrarError::InternalError(
                    "channel bind returned zero id".to_string(),
                ))
            }
            Err(e) => {
                error!("Channel bind for {} failed: {}", identity, e);
                let _ = self.table.remove(identity, &entry).await;
                Err(RegistrarError::InternalError(format!(
                    "channel bind failed: {}",
                    e
                )))
            }
        }
    }
}
