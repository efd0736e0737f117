//! Fire-and-forget signals flows hand back to the host UI.
//!
//! The core never navigates; it reports what happened and the host decides
//! which screen comes next.

use crate::model::forageable::ForageableId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationSignal {
    /// A create or update was persisted.
    EntrySaved { id: ForageableId },
    /// A record was removed; its edit flow is closed.
    EntryDeleted { id: ForageableId },
    /// The detail screen asked to edit a record.
    EditRequested { id: ForageableId },
    /// A wheel spin finished.
    SpinCompleted { gained: u32, total: u32 },
}
