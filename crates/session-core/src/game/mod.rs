//! Pure game rules
//!
//! Board state, win detection and the deterministic fallback move are pure
//! functions with no session or timing dependencies, so the turn-timeout
//! path, the automated participant and the tests all share one rule set.

mod board;

pub use board::Board;
