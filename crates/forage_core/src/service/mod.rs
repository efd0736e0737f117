//! Core use-case services and screen flows.
//!
//! # Responsibility
//! - Orchestrate store calls into validated, observable commands.
//! - Model per-screen lifecycles without performing navigation.

pub mod detail_flow;
pub mod edit_flow;
pub mod forageable_service;
pub mod navigation;
