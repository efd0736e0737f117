//! Add/edit screen state machine.
//!
//! # Responsibility
//! - Decide between add and update from the navigation id.
//! - Track the `New -> Persisted -> Removed` lifecycle of one edit session.
//!
//! # Invariants
//! - `Removed` is terminal; every later command fails with `Closed`.
//! - A rejected save leaves the state unchanged.

use crate::model::forageable::{is_persisted_id, Forageable, ForageableId, ForageableInput};
use crate::observe::Subscription;
use crate::repo::forageable_repo::ForageableStore;
use crate::service::forageable_service::{ForageableService, ForageableServiceError};
use crate::service::navigation::NavigationSignal;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lifecycle of the record an edit session is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    New,
    Persisted(ForageableId),
    Removed(ForageableId),
}

impl EditState {
    /// Maps a navigation id to the initial state; `id <= 0` means new.
    pub fn from_nav_id(id: ForageableId) -> Self {
        if is_persisted_id(id) {
            Self::Persisted(id)
        } else {
            Self::New
        }
    }
}

#[derive(Debug)]
pub enum EditFlowError {
    /// The record was deleted by this flow; no further commands apply.
    Closed(ForageableId),
    /// Delete requested before the record was ever saved.
    NotPersisted,
    Service(ForageableServiceError),
}

impl Display for EditFlowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed(id) => write!(f, "edit flow for forageable {id} is closed"),
            Self::NotPersisted => write!(f, "nothing to delete: entry was never saved"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditFlowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ForageableServiceError> for EditFlowError {
    fn from(value: ForageableServiceError) -> Self {
        Self::Service(value)
    }
}

/// One add/edit session over a shared service.
pub struct EditFlow<'svc, S: ForageableStore> {
    service: &'svc ForageableService<S>,
    state: EditState,
}

impl<'svc, S: ForageableStore> EditFlow<'svc, S> {
    /// Opens a session addressed by a navigation id.
    pub fn open(service: &'svc ForageableService<S>, nav_id: ForageableId) -> Self {
        Self {
            service,
            state: EditState::from_nav_id(nav_id),
        }
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    /// Subscription used to bind the form to the stored record.
    ///
    /// Returns `None` for a new entry.
    pub fn bind(&self) -> Result<Option<Subscription<Option<Forageable>>>, EditFlowError> {
        match self.state {
            EditState::New => Ok(None),
            EditState::Persisted(id) => Ok(Some(self.service.retrieve_forageable(id)?)),
            EditState::Removed(id) => Err(EditFlowError::Closed(id)),
        }
    }

    /// Adds or updates depending on the current state.
    pub fn save(&mut self, input: &ForageableInput) -> Result<NavigationSignal, EditFlowError> {
        let id = match self.state {
            EditState::New => self.service.add_forageable(input)?,
            EditState::Persisted(id) => {
                self.service.update_forageable(id, input)?;
                id
            }
            EditState::Removed(id) => return Err(EditFlowError::Closed(id)),
        };
        self.state = EditState::Persisted(id);
        Ok(NavigationSignal::EntrySaved { id })
    }

    /// Deletes the bound record and closes the flow.
    pub fn delete(&mut self) -> Result<NavigationSignal, EditFlowError> {
        let id = match self.state {
            EditState::New => return Err(EditFlowError::NotPersisted),
            EditState::Persisted(id) => id,
            EditState::Removed(id) => return Err(EditFlowError::Closed(id)),
        };
        self.service.delete_by_id(id)?;
        self.state = EditState::Removed(id);
        Ok(NavigationSignal::EntryDeleted { id })
    }
}
