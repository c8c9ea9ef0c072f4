//! External collaborator seams
//!
//! Credential verification, profile storage and channel binding are owned
//! by other services; this module carries only the trait seams the login
//! flow composes, plus in-memory doubles for tests and local runs.

mod doubles;

pub use doubles::{FailingBinder, LoopbackBinder, MemoryProfileStore, StaticAuthenticator};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Opaque account identifier issued by the authenticator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player profile; the schema is not part of this core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub account_id: AccountId,
    pub identity: String,
    pub display_name: String,
}

/// Profile field mutations for `ProfileStore::save`
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
}

/// Credential verification seam
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `None` means the credentials were rejected
    async fn authenticate(&self, identity: &str, secret: &str) -> Option<AccountId>;
}

/// Persistent profile storage seam; eventually consistent
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load(&self, account_id: &AccountId) -> Result<Option<Profile>>;
    async fn create(&self, profile: Profile) -> Result<()>;
    async fn save(&self, account_id: &AccountId, update: ProfileUpdate) -> Result<()>;
}
