//! Per-node session directory
//!
//! A single worker task owns the session table: it spawns and supervises
//! session tasks, tracks the live count, and drains every child before
//! terminating itself on shutdown. Callers go through [`DirectoryClient`].

mod worker;

pub use worker::{DirectoryClient, DirectoryStats, SessionDirectory};
