//! Publisher side: one listing channel plus lazily created per-id channels.

use super::subscription::Subscription;
use crate::model::forageable::{Forageable, ForageableId};
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

type RecordSender = watch::Sender<Option<Forageable>>;

/// Snapshot hub shared by the service and its subscribers.
#[derive(Debug)]
pub struct ForageableFeed {
    listing: watch::Sender<Vec<Forageable>>,
    records: Mutex<HashMap<ForageableId, RecordSender>>,
}

impl ForageableFeed {
    /// Creates a hub seeded with the current listing.
    pub fn new(initial_listing: Vec<Forageable>) -> Self {
        let (listing, _) = watch::channel(initial_listing);
        Self {
            listing,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribes to the full listing.
    pub fn subscribe_all(&self) -> Subscription<Vec<Forageable>> {
        Subscription::new(self.listing.subscribe())
    }

    /// Subscribes to one record.
    ///
    /// `load` supplies the current value when no channel exists yet for `id`;
    /// an existing channel already holds the latest published value.
    pub fn subscribe_record<E>(
        &self,
        id: ForageableId,
        load: impl FnOnce() -> Result<Option<Forageable>, E>,
    ) -> Result<Subscription<Option<Forageable>>, E> {
        let mut records = self.lock_records();
        records.retain(|_, sender| !sender.is_closed());

        let rx = match records.get(&id) {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, rx) = watch::channel(load()?);
                records.insert(id, sender);
                rx
            }
        };
        debug!(
            "event=feed_subscribe module=observe status=ok id={id} open_channels={}",
            records.len()
        );
        Ok(Subscription::new(rx))
    }

    /// Publishes a new listing snapshot.
    pub fn publish_listing(&self, listing: Vec<Forageable>) {
        self.listing.send_replace(listing);
    }

    /// Publishes the state of one record (`None` once deleted).
    ///
    /// Records nobody subscribed to are skipped.
    pub fn publish_record(&self, id: ForageableId, record: Option<Forageable>) {
        let mut records = self.lock_records();
        if let Some(sender) = records.get(&id) {
            if sender.is_closed() {
                records.remove(&id);
            } else {
                sender.send_replace(record);
            }
        }
    }

    /// Number of listing subscribers still attached.
    pub fn listing_subscribers(&self) -> usize {
        self.listing.receiver_count()
    }

    /// Number of records with at least one live subscriber.
    pub fn record_channels(&self) -> usize {
        let mut records = self.lock_records();
        records.retain(|_, sender| !sender.is_closed());
        records.len()
    }

    fn lock_records(&self) -> MutexGuard<'_, HashMap<ForageableId, RecordSender>> {
        // The map holds no invariant a panicking holder could break.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
