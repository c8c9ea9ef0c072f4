//! Common infrastructure for the duelgrid stack
//!
//! Shared building blocks used by the session and registrar crates:
//! logging setup over `tracing-subscriber`, the crate-level error type,
//! and the cluster membership event abstraction that higher layers
//! subscribe to for coordinator discovery.

pub mod errors;
pub mod logging;
pub mod membership;

pub use errors::{Error, Result};
pub use logging::{setup_logging, LoggingConfig};
