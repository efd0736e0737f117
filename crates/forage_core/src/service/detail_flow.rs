//! Detail screen binding for one record.

use crate::model::forageable::{Forageable, ForageableId};
use crate::observe::Subscription;
use crate::repo::forageable_repo::ForageableStore;
use crate::service::forageable_service::{ForageableService, ServiceResult};
use crate::service::navigation::NavigationSignal;

/// Keeps a record subscription alive for as long as the screen is shown.
pub struct DetailFlow {
    id: ForageableId,
    subscription: Subscription<Option<Forageable>>,
}

impl DetailFlow {
    pub fn open<S: ForageableStore>(
        service: &ForageableService<S>,
        id: ForageableId,
    ) -> ServiceResult<Self> {
        Ok(Self {
            id,
            subscription: service.retrieve_forageable(id)?,
        })
    }

    pub fn id(&self) -> ForageableId {
        self.id
    }

    /// Latest snapshot; `None` once the record is deleted.
    pub fn current(&self) -> Option<Forageable> {
        self.subscription.current()
    }

    /// Newest snapshot not yet seen by this screen.
    pub fn poll_update(&mut self) -> Option<Option<Forageable>> {
        self.subscription.poll_update()
    }

    pub fn request_edit(&self) -> NavigationSignal {
        NavigationSignal::EditRequested { id: self.id }
    }

    /// Map lookup URI for the current location, if the record still exists.
    pub fn map_query(&self) -> Option<String> {
        self.current().map(|record| record.map_query())
    }

    /// Ends the screen's subscription.
    pub fn close(self) {
        self.subscription.cancel();
    }
}
