//! Per-session game state machine
//!
//! Each session runs as its own mailbox task that processes one command to
//! completion before the next, so session state is never shared and never
//! locked. Callers interact through the cheap-to-clone [`SessionClient`];
//! the directory owns the task handle and supervises termination.

mod client;
mod machine;
mod timer;

pub use client::SessionClient;

pub(crate) use machine::spawn_session;
