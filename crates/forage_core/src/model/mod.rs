//! Domain model for forageable tracking.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep required-field validation next to the data it guards.
//!
//! # Invariants
//! - Every persisted record is identified by a positive `ForageableId`.
//! - Deletion is a hard delete; no tombstones are kept.

pub mod forageable;
