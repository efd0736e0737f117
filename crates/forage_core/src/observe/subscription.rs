//! Subscriber handle over one snapshot channel.

use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::watch;

/// Publisher side of a subscription went away (the owning feed was dropped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionClosed;

impl Display for SubscriptionClosed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "subscription publisher closed")
    }
}

impl Error for SubscriptionClosed {}

/// Live view of a snapshot stream.
///
/// Dropping the handle (or calling [`Subscription::cancel`]) stops delivery.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    /// Wraps a receiver so that its current value counts as unseen.
    pub(crate) fn new(mut rx: watch::Receiver<T>) -> Self {
        rx.mark_changed();
        Self { rx }
    }

    /// Latest published snapshot, without consuming the pending flag.
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Returns the newest snapshot if one arrived since the last call.
    ///
    /// The first call after subscribing yields the initial snapshot.
    pub fn poll_update(&mut self) -> Option<T> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            Ok(false) | Err(_) => None,
        }
    }

    /// Waits for the next unseen snapshot.
    ///
    /// # Errors
    /// Returns `SubscriptionClosed` once the publisher is gone and every
    /// snapshot has been seen.
    pub async fn changed(&mut self) -> Result<T, SubscriptionClosed> {
        self.rx.changed().await.map_err(|_| SubscriptionClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Ends the subscription. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}
