//! Logging infrastructure for duelgrid nodes

mod setup;

pub use setup::{parse_log_level, setup_logging, LoggingConfig};
