//! Shared helpers for session-core integration tests

#![allow(dead_code)]

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use duelgrid_session_core::api::event_channel;
use duelgrid_session_core::{
    DirectoryClient, DirectoryConfig, DirectoryStats, GameEvent, SessionClient, SessionConfig,
    SessionDirectory, Slot,
};

/// Session config with a fixed first mover so tests are deterministic
pub fn deterministic_config() -> SessionConfig {
    SessionConfig::default().with_first_mover(Slot(1))
}

pub fn start_directory() -> DirectoryClient {
    SessionDirectory::start(DirectoryConfig::default().with_node_name("test-node"))
}

/// A joined test participant with its event receiver
pub struct TestPlayer {
    pub identity: String,
    pub slot: Slot,
    pub events: mpsc::UnboundedReceiver<GameEvent>,
}

pub async fn join(session: &SessionClient, identity: &str) -> TestPlayer {
    let (sink, events) = event_channel();
    let (slot, _snapshot) = session
        .join(identity, identity, sink)
        .await
        .unwrap_or_else(|e| panic!("{} failed to join: {}", identity, e));
    TestPlayer {
        identity: identity.to_string(),
        slot,
        events,
    }
}

/// Join alice and bob; the pair fills the session and starts the game
pub async fn join_pair(session: &SessionClient) -> (TestPlayer, TestPlayer) {
    let alice = join(session, "alice").await;
    let bob = join(session, "bob").await;
    (alice, bob)
}

/// Next event for `player`, bounded so a missing event fails the test
pub async fn next_event(player: &mut TestPlayer) -> GameEvent {
    timeout(Duration::from_secs(5), player.events.recv())
        .await
        .unwrap_or_else(|_| panic!("{} timed out waiting for an event", player.identity))
        .unwrap_or_else(|| panic!("event channel for {} closed", player.identity))
}

/// Drain events until `GameBegun`; returns the first mover
pub async fn wait_for_begin(player: &mut TestPlayer) -> Slot {
    loop {
        if let GameEvent::GameBegun { first_mover } = next_event(player).await {
            return first_mover;
        }
    }
}

/// Poll directory stats until `cond` holds
pub async fn wait_for_stats(
    directory: &DirectoryClient,
    cond: impl Fn(&DirectoryStats) -> bool,
) -> DirectoryStats {
    for _ in 0..500 {
        if let Ok(stats) = directory.stats().await {
            if cond(&stats) {
                return stats;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("directory stats never reached the expected condition");
}
