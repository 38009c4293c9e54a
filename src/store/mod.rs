//! Catalog state: records, ordering, selection, and change notification.

mod catalog;
mod notify;
mod persistence;
mod records;
mod selection;
mod sort;
mod status;

pub use catalog::Catalog;
pub use notify::{CatalogChange, ChangeKind, ChangeNotifier, Subscription};
pub use persistence::{BookRepository, ChangeSet, CommitReceipt, PersistenceError, StoredBook};
pub use records::{BookHandle, RecordStore};
pub use selection::{Selection, SelectionController};
pub use sort::{SortController, SortState};
pub use status::{status_label, StatusLabelBinder, NO_RECORDS, NO_SELECTION};
