//! Distributed session registration
//!
//! Enforces one live game session per user identity cluster-wide. The
//! [`RegistrationTable`] seam is a conditional-insert (compare-and-swap)
//! store; [`Registrar`] layers bounded optimistic retry on top of it and
//! binds the participant-facing handle to the inbound connection channel
//! once the identity is reserved.
//!
//! Stale table entries are removed asynchronously by the session-termination
//! cleanup contract, never by locking; the retry loop exists to ride out
//! that gap.

pub mod error;
pub mod registrar;
pub mod table;

pub use error::{RegistrarError, Result};
pub use registrar::{ChannelBinder, ChannelId, Registrar, RegistrarConfig, RegistrationGrant};
pub use table::{InsertOutcome, MemoryRegistrationTable, RegistrationTable, SessionRef};
