//! Registration table seam and in-memory implementation

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;

/// Cluster-wide reference to a live session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRef {
    /// Node hosting the session
    pub node: String,
    /// Session identifier on that node
    pub session_id: u64,
}

impl SessionRef {
    pub fn new(node: impl Into<String>, session_id: u64) -> Self {
        Self {
            node: node.into(),
            session_id,
        }
    }
}

impl std::fmt::Display for SessionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.node, self.session_id)
    }
}

/// Outcome of a conditional insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The identity was free and the entry is now live
    Inserted,
    /// Another entry already holds the identity
    Occupied(SessionRef),
}

/// Conditional-insert store enforcing at most one live entry per identity
///
/// Any store with compare-and-swap insert semantics satisfies this seam;
/// the invariant lives in `try_insert`, not in the caller.
#[async_trait]
pub trait RegistrationTable: Send + Sync {
    /// Insert `entry` for `identity` only if no entry is present
    async fn try_insert(&self, identity: &str, entry: SessionRef) -> Result<InsertOutcome>;

    /// Remove the entry for `identity` only if it matches `entry`,
    /// so a stale cleanup never clobbers a newer registration.
    /// Returns whether an entry was removed.
    async fn remove(&self, identity: &str, entry: &SessionRef) -> Result<bool>;

    /// Current entry for `identity`, if any
    async fn lookup(&self, identity: &str) -> Result<Option<SessionRef>>;
}

/// In-memory registration table over DashMap entry-level CAS
pub struct MemoryRegistrationTable {
    entries: Arc<DashMap<String, SessionRef>>,
}

impl MemoryRegistrationTable {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl RegistrationTable for MemoryRegistrationTable {
    async fn try_insert(&self, identity: &str, entry: SessionRef) -> Result<InsertOutcome> {
        match self.entries.entry(identity.to_string()) {
            Entry::Occupied(existing) => Ok(InsertOutcome::Occupied(existing.get().clone())),
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    async fn remove(&self, identity: &str, entry: &SessionRef) -> Result<bool> {
        Ok(self
            .entries
            .remove_if(identity, |_, existing| existing == entry)
            .is_some())
    }

    async fn lookup(&self, identity: &str) -> Result<Option<SessionRef>> {
        Ok(self.entries.get(identity).map(|e| e.clone()))
    }
}
