//! Snapshot publication for forageable observers.
//!
//! # Responsibility
//! - Deliver single-record and listing snapshots to subscribers.
//! - Release per-record channels once their last subscriber is gone.
//!
//! # Invariants
//! - A new subscription first yields the snapshot current at subscribe time.
//! - Snapshots are published in mutation order; a subscriber that falls
//!   behind sees the newest value, never an older one after a newer one.
//!
//! Channels are `tokio::sync::watch`, so publishing never blocks and
//! subscribers may poll synchronously or await from an async runtime.

mod feed;
mod subscription;

pub use feed::ForageableFeed;
pub use subscription::{Subscription, SubscriptionClosed};
