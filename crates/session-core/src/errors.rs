//! Error types for session operations
//!
//! All caller-visible failures are stable coded variants, never raw faults,
//! so remote cluster callers can interpret them uniformly.

use crate::api::types::SessionId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Join rejected because the game has left the waiting state
    #[error("Game already started")]
    GameAlreadyStarted,

    /// Join rejected because the session is at capacity
    #[error("Session is full")]
    SessionFull,

    /// The identity does not hold a slot in this session
    #[error("Not a participant in this session")]
    NotInSession,

    /// Move rejected because the slot is not the current mover
    #[error("Not your turn")]
    NotYourTurn,

    /// Move rejected because the position is out of bounds or occupied
    #[error("Invalid position")]
    InvalidPosition,

    /// A session with this id already exists on the node
    #[error("Duplicate session id: {0}")]
    DuplicateSession(SessionId),

    /// The session is unknown or its task has already terminated
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// The directory is draining and accepts no new sessions
    #[error("Directory is shutting down")]
    ShuttingDown,

    /// Session spawn failed; no partial state remains
    #[error("Session creation failed: {0}")]
    CreationFailed(String),

    /// Credential check failed
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Registration protocol failure
    #[error("Registration failed: {0}")]
    Registration(#[from] duelgrid_registrar_core::RegistrarError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
