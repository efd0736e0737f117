//! Repository layer: storage contracts and their SQLite implementations.
//!
//! # Responsibility
//! - Define the store contract the service layer depends on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Store writes enforce required-field validation before persistence.
//! - Store APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod forageable_repo;
