//! Cluster membership event abstraction
//!
//! Higher layers never talk to the cluster transport directly. They announce
//! a capability through [`MemberDirectory`] and consume coordinator presence
//! changes through [`MembershipEvents`]. Events are delivered at-least-once
//! by the transport, so consumers must handle redelivery idempotently.
//!
//! A channel-backed synthetic implementation is provided so tests can inject
//! membership changes without a running transport.

mod events;

pub use events::{
    ClusterEvent, CoordinatorRef, MemberDirectory, MembershipEvents, MembershipFeed,
    NodeCapability, SyntheticDirectory, SyntheticMembership,
};
