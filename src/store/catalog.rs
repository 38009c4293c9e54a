//! Command layer: the single owner of the record store, its sort and
//! selection controllers, and the repository behind them. Every mutation goes
//! through here so observers see one notification per user action.

use log::{debug, error, info};

use crate::models::{Book, SortError, SortKey};

use super::notify::{CatalogChange, ChangeKind, ChangeNotifier, Subscription};
use super::persistence::{BookRepository, PersistenceError};
use super::records::{BookHandle, RecordStore};
use super::selection::{Selection, SelectionController};
use super::sort::{SortController, SortState};
use super::status::{status_label, StatusLabelBinder};

pub struct Catalog<R: BookRepository> {
    repo: R,
    store: RecordStore,
    sorter: SortController,
    selection: SelectionController,
    notifier: ChangeNotifier,
}

impl<R: BookRepository> Catalog<R> {
    /// Read every stored book and start with nothing selected.
    pub fn load(repo: R) -> Result<Self, PersistenceError> {
        let books = repo.load_all()?;
        info!(
            "event=catalog_load module=catalog status=ok count={}",
            books.len()
        );
        Ok(Self {
            repo,
            store: RecordStore::from_stored(books),
            sorter: SortController::new(),
            selection: SelectionController::new(),
            notifier: ChangeNotifier::new(),
        })
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&CatalogChange) + 'static,
    {
        self.notifier.subscribe(listener)
    }

    /// Bind a record counter label to this catalog.
    pub fn bind_status_label(&self) -> StatusLabelBinder {
        StatusLabelBinder::attach(&self.notifier, self.store.len(), self.selection())
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn selection(&self) -> Selection {
        self.selection.selection()
    }

    pub fn selected(&self) -> Option<(BookHandle, &Book)> {
        let handle = self.selection.selected_handle(&self.store)?;
        self.store.get(handle).map(|book| (handle, book))
    }

    pub fn status_label(&self) -> String {
        status_label(self.store.len(), self.selection())
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sorter.indicator(&self.store)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.store.has_unsaved_changes()
    }

    /// Append a blank book and select it. An active filter is cleared first
    /// so the new row is visible.
    pub fn add(&mut self) -> BookHandle {
        if self.store.filter().is_some() {
            debug!("event=filter_clear module=catalog reason=add");
            self.store.set_filter(None);
        }
        let handle = self.store.add();
        self.selection.select_handle(&self.store, handle);
        debug!(
            "event=book_add module=catalog status=ok count={}",
            self.store.len()
        );
        self.publish(ChangeKind::Records);
        handle
    }

    /// Remove the selected book. The selection moves to the row now at the
    /// same position, or the new last row.
    pub fn remove_selected(&mut self) -> Option<Book> {
        let handle = self.selection.selected_handle(&self.store)?;
        let removed = self.store.remove(handle)?;
        self.selection.reconcile(&self.store, Some(handle));
        debug!(
            "event=book_remove module=catalog status=ok count={}",
            self.store.len()
        );
        self.publish(ChangeKind::Records);
        Some(removed)
    }

    /// Replace the selected book's fields. Returns `false` when nothing is
    /// selected or nothing changed.
    pub fn update_selected(&mut self, book: Book) -> bool {
        let Some(handle) = self.selection.selected_handle(&self.store) else {
            return false;
        };
        if !self.store.update(handle, book) {
            return false;
        }
        // An edit can move the record under the active sort or filter.
        self.selection.reconcile(&self.store, Some(handle));
        self.publish(ChangeKind::Records);
        true
    }

    /// Write all pending changes. On failure the in-memory state, including
    /// the pending changes, is left as it was so the save can be retried.
    pub fn save(&mut self) -> Result<usize, PersistenceError> {
        let changes = self.store.pending_changes();
        if changes.is_empty() {
            debug!("event=catalog_save module=catalog status=skipped reason=clean");
            return Ok(0);
        }
        match self.repo.commit(&changes) {
            Ok(receipt) => {
                self.store.mark_committed(&receipt);
                info!(
                    "event=catalog_save module=catalog status=ok inserted={} updated={} deleted={}",
                    changes.inserted.len(),
                    changes.updated.len(),
                    changes.deleted.len()
                );
                self.publish(ChangeKind::Saved);
                Ok(changes.len())
            }
            Err(err) => {
                error!("event=catalog_save module=catalog status=error error={err}");
                Err(err)
            }
        }
    }

    pub fn go_first(&mut self) {
        self.selection.go_first(self.store.len());
        self.publish(ChangeKind::Selection);
    }

    pub fn go_last(&mut self) {
        self.selection.go_last(self.store.len());
        self.publish(ChangeKind::Selection);
    }

    pub fn go_next(&mut self) {
        self.selection.go_next(self.store.len());
        self.publish(ChangeKind::Selection);
    }

    pub fn go_previous(&mut self) {
        self.selection.go_previous(self.store.len());
        self.publish(ChangeKind::Selection);
    }

    pub fn select(&mut self, index: usize) {
        self.selection.select(index, self.store.len());
        self.publish(ChangeKind::Selection);
    }

    /// Column-header sort. See [`SortController::sort_by_column`].
    pub fn sort_by_column(&mut self, key: SortKey) -> SortState {
        let previous = self.selection.selected_handle(&self.store);
        let state = self.sorter.sort_by_column(&mut self.store, key);
        self.selection.reconcile(&self.store, previous);
        self.publish(ChangeKind::Sort);
        state
    }

    /// Attribute-name sort. See [`SortController::sort_by_attribute`].
    pub fn sort_by_attribute(&mut self, name: &str) -> Result<SortState, SortError> {
        let previous = self.selection.selected_handle(&self.store);
        let state = self.sorter.sort_by_attribute(&mut self.store, name)?;
        self.selection.reconcile(&self.store, previous);
        self.publish(ChangeKind::Sort);
        Ok(state)
    }

    /// Direction the next column-header sort will apply.
    pub fn next_column_ascending(&self) -> bool {
        self.sorter.next_column_ascending()
    }

    pub fn filter(&self) -> Option<&str> {
        self.store.filter()
    }

    pub fn set_filter(&mut self, filter: Option<&str>) {
        let previous = self.selection.selected_handle(&self.store);
        self.store.set_filter(filter);
        self.selection.reconcile(&self.store, previous);
        self.publish(ChangeKind::Filter);
    }

    fn publish(&self, kind: ChangeKind) {
        self.notifier.publish(&CatalogChange {
            kind,
            count: self.store.len(),
            selection: self.selection(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::store::{ChangeSet, CommitReceipt, StoredBook};

    /// Repository double that records commits and can be told to reject them.
    #[derive(Default)]
    struct MemoryRepo {
        stored: Vec<StoredBook>,
        next_id: i64,
        reject: bool,
        commits: usize,
    }

    impl MemoryRepo {
        fn with(books: &[(&str, &str, &str)]) -> Self {
            let stored = books
                .iter()
                .enumerate()
                .map(|(idx, (title, author, year))| StoredBook {
                    id: idx as i64 + 1,
                    book: Book::new(title, author, year),
                })
                .collect::<Vec<_>>();
            Self {
                next_id: stored.len() as i64 + 1,
                stored,
                ..Self::default()
            }
        }
    }

    impl BookRepository for MemoryRepo {
        fn load_all(&self) -> Result<Vec<StoredBook>, PersistenceError> {
            Ok(self.stored.clone())
        }

        fn commit(&mut self, changes: &ChangeSet) -> Result<CommitReceipt, PersistenceError> {
            if self.reject {
                return Err(PersistenceError::MissingRecord(-1));
            }
            self.commits += 1;
            self.stored.retain(|s| !changes.deleted.contains(&s.id));
            for (id, book) in &changes.updated {
                if let Some(stored) = self.stored.iter_mut().find(|s| s.id == *id) {
                    stored.book = book.clone();
                }
            }
            let mut receipt = CommitReceipt::default();
            for (handle, book) in &changes.inserted {
                let id = self.next_id;
                self.next_id += 1;
                self.stored.push(StoredBook {
                    id,
                    book: book.clone(),
                });
                receipt.inserted.push((*handle, id));
            }
            Ok(receipt)
        }
    }

    fn titles<R: BookRepository>(catalog: &Catalog<R>) -> Vec<String> {
        catalog
            .store()
            .all()
            .into_iter()
            .map(|b| b.title.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn column_sort_scenario() {
        let mut catalog =
            Catalog::load(MemoryRepo::with(&[("Zeta", "A", "2000"), ("Alpha", "B", "1999")]))
                .unwrap();

        catalog.sort_by_column(SortKey::Title);
        assert_eq!(titles(&catalog), vec!["Alpha", "Zeta"]);

        catalog.sort_by_column(SortKey::Title);
        assert_eq!(titles(&catalog), vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn adding_to_empty_catalog_selects_new_record() {
        let mut catalog = Catalog::load(MemoryRepo::default()).unwrap();
        let label = catalog.bind_status_label();
        assert_eq!(label.text(), "No Records");

        let handle = catalog.add();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.selection(), Selection::At(0));
        assert_eq!(catalog.selected().map(|(h, _)| h), Some(handle));
        assert_eq!(label.text(), "Record 1 of 1");
    }

    #[test]
    fn removing_only_record_clears_selection() {
        let mut catalog = Catalog::load(MemoryRepo::with(&[("Solo", "", "")])).unwrap();
        let label = catalog.bind_status_label();
        assert_eq!(label.text(), "No Selection");

        catalog.go_first();
        assert_eq!(label.text(), "Record 1 of 1");

        let removed = catalog.remove_selected().unwrap();
        assert_eq!(removed.title.as_deref(), Some("Solo"));
        assert_eq!(catalog.selection(), Selection::None);
        assert_eq!(label.text(), "No Records");
    }

    #[test]
    fn remove_without_selection_does_nothing() {
        let mut catalog = Catalog::load(MemoryRepo::with(&[("A", "", "")])).unwrap();
        assert!(catalog.remove_selected().is_none());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn selection_follows_record_through_sort() {
        let mut catalog = Catalog::load(MemoryRepo::with(&[
            ("Zeta", "A", "2000"),
            ("Alpha", "B", "1999"),
        ]))
        .unwrap();
        let label = catalog.bind_status_label();
        catalog.go_first();
        assert_eq!(label.text(), "Record 1 of 2");

        catalog.sort_by_column(SortKey::Title);

        assert_eq!(catalog.selection(), Selection::At(1));
        assert_eq!(
            catalog.selected().unwrap().1.title.as_deref(),
            Some("Zeta")
        );
        assert_eq!(label.text(), "Record 2 of 2");
    }

    #[test]
    fn invalid_attribute_changes_nothing() {
        let mut catalog = Catalog::load(MemoryRepo::with(&[("B", "", ""), ("A", "", "")])).unwrap();
        let events = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&events);
        let _sub = catalog.subscribe(move |_| *sink.borrow_mut() += 1);

        assert!(catalog.sort_by_attribute("colour").is_err());

        assert_eq!(titles(&catalog), vec!["B", "A"]);
        assert_eq!(catalog.sort_state(), None);
        assert_eq!(*events.borrow(), 0);
    }

    #[test]
    fn save_commits_and_clears_pending_state() {
        let mut catalog = Catalog::load(MemoryRepo::with(&[("Old", "", "")])).unwrap();
        catalog.go_first();
        assert!(catalog.update_selected(Book::new("Renamed", "", "")));
        catalog.add();
        assert!(catalog.has_unsaved_changes());

        assert_eq!(catalog.save().unwrap(), 2);

        assert!(!catalog.has_unsaved_changes());
        assert_eq!(catalog.repository().commits, 1);
        assert_eq!(catalog.repository().stored.len(), 2);
        assert_eq!(catalog.save().unwrap(), 0);
        assert_eq!(catalog.repository().commits, 1);
    }

    #[test]
    fn failed_save_keeps_changes_for_retry() {
        let mut catalog = Catalog::load(MemoryRepo::default()).unwrap();
        catalog.add();
        catalog.repo.reject = true;

        assert!(matches!(
            catalog.save(),
            Err(PersistenceError::MissingRecord(_))
        ));
        assert!(catalog.has_unsaved_changes());
        assert_eq!(catalog.len(), 1);

        catalog.repo.reject = false;
        assert_eq!(catalog.save().unwrap(), 1);
        assert!(!catalog.has_unsaved_changes());
    }

    #[test]
    fn add_clears_filter() {
        let mut catalog =
            Catalog::load(MemoryRepo::with(&[("Dune", "Herbert", ""), ("Emma", "Austen", "")]))
                .unwrap();
        catalog.set_filter(Some("austen"));
        assert_eq!(catalog.len(), 1);

        catalog.add();

        assert_eq!(catalog.filter(), None);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.selection(), Selection::At(2));
    }

    #[test]
    fn filter_hiding_selection_clamps_index() {
        let mut catalog = Catalog::load(MemoryRepo::with(&[
            ("Dune", "Herbert", ""),
            ("Emma", "Austen", ""),
            ("Persuasion", "Austen", ""),
        ]))
        .unwrap();
        catalog.go_last();
        catalog.set_filter(Some("herbert"));
        assert_eq!(catalog.selection(), Selection::At(0));

        catalog.set_filter(Some("nobody"));
        assert_eq!(catalog.selection(), Selection::None);
        assert_eq!(catalog.status_label(), "No Records");
    }
}
