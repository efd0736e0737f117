//! Forageable use-case service.
//!
//! # Responsibility
//! - Gate add/update commands on required fields.
//! - Delegate persistence to a `ForageableStore`.
//! - Republish record and listing snapshots after every successful mutation.
//!
//! # Invariants
//! - Invalid input never reaches the store; callers get `ValidationFailed`.
//! - Publication happens after the store write succeeds, in call order.
//! - Store failures are returned to the caller, never swallowed.
//! - A committed write is reported as success; a failed listing refresh
//!   afterwards is logged and leaves the previous listing snapshot in place.

use crate::model::forageable::{
    self, Forageable, ForageableId, ForageableInput, ForageableValidationError,
};
use crate::observe::{ForageableFeed, Subscription};
use crate::repo::forageable_repo::{ForageableStore, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ForageableServiceError>;

/// Service error for forageable use-cases.
#[derive(Debug)]
pub enum ForageableServiceError {
    /// A required field is empty.
    ValidationFailed(ForageableValidationError),
    /// Target record does not exist.
    NotFound(ForageableId),
    /// Storage failure bubbled up from the store.
    Storage(RepoError),
}

impl Display for ForageableServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationFailed(err) => write!(f, "validation failed: {err}"),
            Self::NotFound(id) => write!(f, "forageable not found: {id}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ForageableServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ValidationFailed(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for ForageableServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::ValidationFailed(err),
            other => Self::Storage(other),
        }
    }
}

impl From<ForageableValidationError> for ForageableServiceError {
    fn from(value: ForageableValidationError) -> Self {
        Self::ValidationFailed(value)
    }
}

/// Observable façade over a forageable store.
pub struct ForageableService<S: ForageableStore> {
    store: S,
    feed: ForageableFeed,
}

impl<S: ForageableStore> ForageableService<S> {
    /// Creates a service, seeding the listing feed from the store.
    pub fn new(store: S) -> ServiceResult<Self> {
        let listing = store.list()?;
        Ok(Self {
            store,
            feed: ForageableFeed::new(listing),
        })
    }

    /// Returns whether `name` and `location_address` pass the required-field
    /// gate. Pure; lets callers block a save before issuing it.
    pub fn is_valid_entry(&self, name: &str, location_address: &str) -> bool {
        forageable::is_valid_entry(name, location_address)
    }

    /// Validates and persists a new record, returning its assigned id.
    pub fn add_forageable(&self, input: &ForageableInput) -> ServiceResult<ForageableId> {
        if let Err(err) = input.validate() {
            warn!("event=forageable_add module=service status=rejected reason={err}");
            return Err(err.into());
        }

        let id = self.store.insert(input)?;
        info!("event=forageable_add module=service status=ok id={id}");

        self.feed
            .publish_record(id, Some(Forageable::from_input(id, input.clone())));
        self.republish_listing("forageable_add", id);
        Ok(id)
    }

    /// Validates and replaces every field of record `id`.
    pub fn update_forageable(
        &self,
        id: ForageableId,
        input: &ForageableInput,
    ) -> ServiceResult<Forageable> {
        if let Err(err) = input.validate() {
            warn!("event=forageable_update module=service status=rejected id={id} reason={err}");
            return Err(err.into());
        }

        self.store.update(id, input).map_err(|err| {
            warn!("event=forageable_update module=service status=error id={id} error={err}");
            err
        })?;
        info!("event=forageable_update module=service status=ok id={id}");

        let updated = Forageable::from_input(id, input.clone());
        self.feed.publish_record(id, Some(updated.clone()));
        self.republish_listing("forageable_update", id);
        Ok(updated)
    }

    /// Deletes `record` by its id.
    ///
    /// Deleting an id that is not stored fails with `NotFound`.
    pub fn delete_forageable(&self, record: &Forageable) -> ServiceResult<()> {
        self.delete_by_id(record.id)
    }

    /// Deletes the record with `id`.
    pub fn delete_by_id(&self, id: ForageableId) -> ServiceResult<()> {
        self.store.delete(id).map_err(|err| {
            warn!("event=forageable_delete module=service status=error id={id} error={err}");
            err
        })?;
        info!("event=forageable_delete module=service status=ok id={id}");

        self.feed.publish_record(id, None);
        self.republish_listing("forageable_delete", id);
        Ok(())
    }

    /// One-shot read of a record.
    pub fn get_forageable(&self, id: ForageableId) -> ServiceResult<Option<Forageable>> {
        Ok(self.store.get(id)?)
    }

    /// One-shot read of every record, in insertion order.
    pub fn list_forageables(&self) -> ServiceResult<Vec<Forageable>> {
        Ok(self.store.list()?)
    }

    /// Subscribes to one record; yields `None` while it does not exist.
    pub fn retrieve_forageable(
        &self,
        id: ForageableId,
    ) -> ServiceResult<Subscription<Option<Forageable>>> {
        self.feed
            .subscribe_record(id, || self.store.get(id).map_err(Into::into))
    }

    /// Subscribes to the full listing.
    pub fn retrieve_all_forageables(&self) -> Subscription<Vec<Forageable>> {
        self.feed.subscribe_all()
    }

    /// Publisher hub, exposed for subscriber bookkeeping.
    pub fn feed(&self) -> &ForageableFeed {
        &self.feed
    }

    fn republish_listing(&self, event: &str, id: ForageableId) {
        match self.store.list() {
            Ok(listing) => self.feed.publish_listing(listing),
            Err(err) => warn!(
                "event={event} module=service status=publish_failed id={id} error={err}"
            ),
        }
    }
}
