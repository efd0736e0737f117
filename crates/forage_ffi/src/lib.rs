//! Flutter-facing bindings over `forage_core`.

pub mod api;
