use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Reference to a coordinator node elsewhere in the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorRef {
    /// Node name as known to the member directory
    pub node: String,
    /// Transport endpoint for the coordinator
    pub endpoint: String,
}

impl CoordinatorRef {
    pub fn new(node: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            endpoint: endpoint.into(),
        }
    }
}

impl std::fmt::Display for CoordinatorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.node, self.endpoint)
    }
}

/// Capability a node announces to the member directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCapability {
    /// Node name
    pub node: String,
    /// Role offered by this node (e.g. "session-worker")
    pub role: String,
}

/// Coordinator presence changes delivered by the cluster transport
///
/// Delivery is at-least-once; the same event may arrive more than once and
/// a `CoordinatorDown` may arrive for a reference that was already replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterEvent {
    CoordinatorUp(CoordinatorRef),
    CoordinatorDown(CoordinatorRef),
}

/// Member directory seam: capability announcement
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Announce this node's capability. No retry here; the transport
    /// re-announces on its own schedule.
    async fn announce(&self, capability: NodeCapability) -> Result<()>;
}

/// Membership event subscription seam
#[async_trait]
pub trait MembershipEvents: Send {
    /// Receive the next membership event; `None` when the subscription closes
    async fn next_event(&mut self) -> Option<ClusterEvent>;
}

/// Channel-backed event feed implementing [`MembershipEvents`]
pub struct MembershipFeed {
    rx: mpsc::UnboundedReceiver<ClusterEvent>,
}

#[async_trait]
impl MembershipEvents for MembershipFeed {
    async fn next_event(&mut self) -> Option<ClusterEvent> {
        self.rx.recv().await
    }
}

/// Synthetic membership source for tests and local wiring
///
/// Hold the `SyntheticMembership` to emit events; hand the paired
/// [`MembershipFeed`] to the consumer. Dropping the emitter closes the feed.
pub struct SyntheticMembership {
    tx: mpsc::UnboundedSender<ClusterEvent>,
}

impl SyntheticMembership {
    /// Create an emitter and its paired event feed
    pub fn channel() -> (Self, MembershipFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, MembershipFeed { rx })
    }

    /// Inject a membership event
    pub fn emit(&self, event: ClusterEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| Error::Membership("membership feed closed".to_string()))
    }
}

/// Member directory double that records announcements
#[derive(Default)]
pub struct SyntheticDirectory {
    announced: Mutex<Vec<NodeCapability>>,
}

impl SyntheticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capabilities announced so far
    ///
    /// Tolerates a poisoned lock; the recorded list stays readable even if
    /// a panicking test thread held it.
    pub fn announcements(&self) -> Vec<NodeCapability> {
        self.announced
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl MemberDirectory for SyntheticDirectory {
    async fn announce(&self, capability: NodeCapability) -> Result<()> {
        self.announced
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(capability);
        Ok(())
    }
}
