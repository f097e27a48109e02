//! Domain model for subscription records.
//!
//! # Invariants
//! - Every record is identified by a stable `SubscriptionId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod subscription;
