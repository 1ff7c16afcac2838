//! Orbit Relate - relationship lifecycle and recommendation queue service
//!
//! This library owns the per-pair relationship state machine, the lazy expiry
//! sweep, the recommendation queue builder, and the connection request
//! coordination for the Orbit networking platform.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{build_queue, clamp_cursor, QueueView};
pub use models::{
    ConnectionOutcome, ExclusionSets, QueueEntry, RelationshipAction, RelationshipRecord,
    RelationshipStatus,
};
