//! Public API types for session orchestration

pub mod config;
pub mod types;

pub use config::{DirectoryConfig, SessionConfig};
pub use types::{
    event_channel, CreateSessionParams, EventSink, GameEvent, GameOutcome, GameSnapshot,
    ParticipantInfo, Position, SessionId, SessionState, Slot,
};
