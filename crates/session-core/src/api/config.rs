//! Session and directory configuration

use crate::api::types::Slot;
use std::time::Duration;

/// Configuration for a single game session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Board edge length; a full line of this length wins
    pub board_size: usize,
    /// Participant capacity
    pub capacity: usize,
    /// Move deadline; expiry produces an automatic fallback move
    pub turn_timeout: Duration,
    /// Fixed first mover for deterministic runs; random when unset
    pub first_mover: Option<Slot>,
    /// Seed for the first-mover draw; entropy when unset
    pub rng_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            board_size: 3,
            capacity: 2,
            turn_timeout: Duration::from_secs(30),
            first_mover: None,
            rng_seed: None,
        }
    }
}

impl SessionConfig {
    pub fn with_board_size(mut self, board_size: usize) -> Self {
        self.board_size = board_size;
        self
    }

    pub fn with_turn_timeout(mut self, turn_timeout: Duration) -> Self {
        self.turn_timeout = turn_timeout;
        self
    }

    pub fn with_first_mover(mut self, first_mover: Slot) -> Self {
        self.first_mover = Some(first_mover);
        self
    }

    pub fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = Some(rng_seed);
        self
    }

    /// Reject configurations no session could run with
    pub fn validate(&self) -> Result<(), String> {
        if self.board_size == 0 {
            return Err("board size must be at least 1".to_string());
        }
        if self.capacity < 2 {
            return Err("capacity must be at least 2".to_string());
        }
        if self.capacity > u8::MAX as usize {
            return Err("capacity exceeds slot range".to_string());
        }
        Ok(())
    }
}

/// Configuration for the per-node session directory
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Node name announced to the cluster and used in session references
    pub node_name: String,
    /// Default per-session configuration
    pub session: SessionConfig,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        DirectoryConfig {
            node_name: "duelgrid-node".to_string(),
            session: SessionConfig::default(),
        }
    }
}

impl DirectoryConfig {
    pub fn with_node_name(mut self, node_name: impl Into<String>) -> Self {
        self.node_name = node_name.into();
        self
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }
}
