//! Core identifiers, game events and snapshots

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Externally supplied unique session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl SessionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Random identifier for callers that do not carry an external id
    pub fn random() -> Self {
        Self(rand::random())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Participant position within a session, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot(pub u8);

impl Slot {
    /// Zero-based index into per-slot storage
    pub fn index(&self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

/// Board position, row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Session lifecycle state
///
/// Monotonic except the Playing self-loop on moves; Ended and Aborted are
/// terminal and no transition leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    WaitingForPlayers,
    Playing,
    Ended,
    Aborted,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Ended | SessionState::Aborted)
    }
}

/// Game outcome framed relative to a single recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Win,
    Loss,
    Draw,
    /// The game ended without a result (abort or forced termination)
    Abandoned,
}

/// Participant visible through a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub slot: Slot,
    pub identity: String,
    pub display_name: String,
    /// Whether a notification sink is currently attached
    pub connected: bool,
}

/// Read-only session state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub session_id: SessionId,
    pub state: SessionState,
    pub board_size: usize,
    /// Row-major cell marks
    pub cells: Vec<Option<Slot>>,
    pub move_count: usize,
    pub current_mover: Option<Slot>,
    pub participants: Vec<ParticipantInfo>,
}

/// Events delivered to session observers
///
/// End-of-game framing is per recipient: the same underlying winner yields
/// `Win` to the winning slot and `Loss` to the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerJoined {
        slot: Slot,
        identity: String,
        display_name: String,
    },
    GameBegun {
        first_mover: Slot,
    },
    MovePlayed {
        mover: Slot,
        position: Position,
        /// `None` when this move ended the game
        next_mover: Option<Slot>,
    },
    GameEnded {
        outcome: GameOutcome,
    },
    GameAborted,
    PlayerLeft {
        slot: Slot,
        identity: String,
    },
    Chat {
        slot: Slot,
        display_name: String,
        text: String,
    },
}

/// Observer delivery target; never owns the transport resource
pub type EventSink = mpsc::UnboundedSender<GameEvent>;

/// Create an event sink and its receiving half
pub fn event_channel() -> (EventSink, mpsc::UnboundedReceiver<GameEvent>) {
    mpsc::unbounded_channel()
}

/// Parameters for creating a session through the directory
#[derive(Debug, Clone, Default)]
pub struct CreateSessionParams {
    /// Per-session config override; the directory default applies otherwise
    pub config: Option<crate::api::config::SessionConfig>,
    /// Spawn an automated participant that joins over the normal protocol
    pub automated_opponent: bool,
}

impl CreateSessionParams {
    pub fn with_config(mut self, config: crate::api::config::SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_automated_opponent(mut self) -> Self {
        self.automated_opponent = true;
        self
    }
}
