//! Cluster discovery bridge
//!
//! Announces the node's session-worker capability to the member directory
//! and tracks coordinator presence from membership events. The current
//! coordinator is published through `ArcSwapOption` for lock-free reads.
//! No retry logic lives here; the transport re-announces on its own.

use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use duelgrid_infra_common::membership::{
    ClusterEvent, CoordinatorRef, MemberDirectory, MembershipEvents, NodeCapability,
};

use crate::errors::{Result, SessionError};

/// Role announced to the member directory
pub const SESSION_WORKER_ROLE: &str = "session-worker";

/// Tracks the cluster coordinator for this node
pub struct DiscoveryBridge {
    coordinator: Arc<ArcSwapOption<CoordinatorRef>>,
}

impl DiscoveryBridge {
    pub fn new() -> Self {
        Self {
            coordinator: Arc::new(ArcSwapOption::empty()),
        }
    }

    /// Currently known coordinator, if any
    pub fn current_coordinator(&self) -> Option<Arc<CoordinatorRef>> {
        self.coordinator.load_full()
    }

    /// Announce the node capability, then consume membership events until
    /// the subscription closes
    pub async fn start(
        &self,
        node_name: &str,
        directory: &dyn MemberDirectory,
        events: impl MembershipEvents + 'static,
    ) -> Result<JoinHandle<()>> {
        directory
            .announce(NodeCapability {
                node: node_name.to_string(),
                role: SESSION_WORKER_ROLE.to_string(),
            })
            .await
            .map_err(|e| SessionError::Internal(format!("capability announcement failed: {}", e)))?;
        info!("Announced {} as {}", node_name, SESSION_WORKER_ROLE);

        let coordinator = self.coordinator.clone();
        let mut events = events;
        Ok(tokio::spawn(async move {
            while let Some(event) = events.next_event().await {
                match event {
                    ClusterEvent::CoordinatorUp(peer) => {
                        debug!("Coordinator up: {}", peer);
                        coordinator.store(Some(Arc::new(peer)));
                    }
                    ClusterEvent::CoordinatorDown(peer) => {
                        // At-least-once delivery: clear only a matching ref,
                        // a stale Down must not evict a newer coordinator
                        let current = coordinator.load();
                        if current.as_deref() == Some(&peer) {
                            debug!("Coordinator down: {}", peer);
                            coordinator.store(None);
                        } else {
                            debug!("Ignoring stale coordinator down: {}", peer);
                        }
                    }
                }
            }
            debug!("Membership subscription closed");
        }))
    }
}
