//! Session orchestration for the duelgrid game service
//!
//! Per-node session directory, per-session timed game state machine,
//! observer routing that survives client reconnects, cluster coordinator
//! discovery, and the login flow that ties them to the distributed
//! registration protocol in `duelgrid-registrar-core`.
//!
//! Concurrency model: the directory worker and every session run as their
//! own mailbox task processing one command to completion before the next,
//! so their state is single-writer and lock-free. Different sessions run
//! concurrently on the runtime; ordering is guaranteed per sender to
//! recipient pair only.

pub mod api;
pub mod auth;
pub mod bot;
pub mod cluster;
pub mod errors;
pub mod game;
pub mod login;
pub mod manager;
pub mod session;

pub use api::{
    CreateSessionParams, DirectoryConfig, GameEvent, GameOutcome, GameSnapshot, Position,
    SessionConfig, SessionId, SessionState, Slot,
};
pub use errors::{Result, SessionError};
pub use manager::{DirectoryClient, DirectoryStats, SessionDirectory};
pub use session::SessionClient;
