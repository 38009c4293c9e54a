//! In-memory record store. Entries are kept in insertion order; the ordered
//! view is rebuilt from that order on every change so sorting stays stable
//! no matter how many times it is applied.

use crate::models::Book;

use super::persistence::{ChangeSet, CommitReceipt, StoredBook};
use super::sort::SortState;

/// Opaque identity of a record for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookHandle(u64);

#[derive(Debug, Clone)]
struct Entry {
    handle: BookHandle,
    /// Row id once the record has been committed.
    row_id: Option<i64>,
    book: Book,
    dirty: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    entries: Vec<Entry>,
    /// Row ids of persisted records removed since the last commit.
    removed: Vec<i64>,
    next_handle: u64,
    sort: Option<SortState>,
    /// Lower-cased filter text.
    filter: Option<String>,
    /// Indexes into `entries`, in display order.
    view: Vec<usize>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with records read from durable storage.
    pub fn from_stored(books: Vec<StoredBook>) -> Self {
        let mut store = Self::new();
        for stored in books {
            let handle = store.issue_handle();
            store.entries.push(Entry {
                handle,
                row_id: Some(stored.id),
                book: stored.book,
                dirty: false,
            });
        }
        store.rebuild_view();
        store
    }

    /// Append a new blank record.
    pub fn add(&mut self) -> BookHandle {
        self.insert(Book::default())
    }

    /// Append a new, not yet persisted record with the given fields.
    pub fn insert(&mut self, book: Book) -> BookHandle {
        let handle = self.issue_handle();
        self.entries.push(Entry {
            handle,
            row_id: None,
            book,
            dirty: true,
        });
        self.rebuild_view();
        handle
    }

    /// Delete a record. Persisted records are queued for deletion on the
    /// next commit.
    pub fn remove(&mut self, handle: BookHandle) -> Option<Book> {
        let idx = self.entries.iter().position(|e| e.handle == handle)?;
        let entry = self.entries.remove(idx);
        if let Some(row_id) = entry.row_id {
            self.removed.push(row_id);
        }
        self.rebuild_view();
        Some(entry.book)
    }

    /// Replace the fields of a record. Returns `true` when anything changed.
    pub fn update(&mut self, handle: BookHandle, book: Book) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.handle == handle) else {
            return false;
        };
        if entry.book == book {
            return false;
        }
        entry.book = book;
        entry.dirty = true;
        self.rebuild_view();
        true
    }

    pub fn get(&self, handle: BookHandle) -> Option<&Book> {
        self.entries
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| &e.book)
    }

    /// The ordered view.
    pub fn all(&self) -> Vec<&Book> {
        self.view.iter().map(|&idx| &self.entries[idx].book).collect()
    }

    /// The ordered view paired with record handles.
    pub fn rows(&self) -> impl Iterator<Item = (BookHandle, &Book)> + '_ {
        self.view.iter().map(|&idx| {
            let entry = &self.entries[idx];
            (entry.handle, &entry.book)
        })
    }

    /// Number of records in the ordered view.
    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    /// Number of records regardless of the filter.
    pub fn total_len(&self) -> usize {
        self.entries.len()
    }

    pub fn handle_at(&self, index: usize) -> Option<BookHandle> {
        self.view.get(index).map(|&idx| self.entries[idx].handle)
    }

    pub fn position(&self, handle: BookHandle) -> Option<usize> {
        self.view
            .iter()
            .position(|&idx| self.entries[idx].handle == handle)
    }

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    /// Replace the active sort and re-order the view immediately.
    pub fn set_sort(&mut self, sort: Option<SortState>) {
        self.sort = sort;
        self.rebuild_view();
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Restrict the view to records containing `filter` in any field. Blank
    /// text clears the filter.
    pub fn set_filter(&mut self, filter: Option<&str>) {
        self.filter = filter
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());
        self.rebuild_view();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.removed.is_empty() || self.entries.iter().any(|e| e.dirty)
    }

    /// Collect every pending insert, update and delete.
    pub fn pending_changes(&self) -> ChangeSet {
        let mut changes = ChangeSet {
            deleted: self.removed.clone(),
            ..ChangeSet::default()
        };
        for entry in self.entries.iter().filter(|e| e.dirty) {
            match entry.row_id {
                Some(row_id) => changes.updated.push((row_id, entry.book.clone())),
                None => changes.inserted.push((entry.handle, entry.book.clone())),
            }
        }
        changes
    }

    /// Record a successful commit: assign row ids and clear pending state.
    pub fn mark_committed(&mut self, receipt: &CommitReceipt) {
        for (handle, row_id) in &receipt.inserted {
            if let Some(entry) = self.entries.iter_mut().find(|e| e.handle == *handle) {
                entry.row_id = Some(*row_id);
            }
        }
        for entry in &mut self.entries {
            entry.dirty = false;
        }
        self.removed.clear();
    }

    fn issue_handle(&mut self) -> BookHandle {
        let handle = BookHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn rebuild_view(&mut self) {
        let entries = &self.entries;
        let mut view: Vec<usize> = match &self.filter {
            Some(needle) => (0..entries.len())
                .filter(|&idx| entries[idx].book.matches(needle))
                .collect(),
            None => (0..entries.len()).collect(),
        };
        if let Some(sort) = self.sort {
            // `sort_by` is stable, and `view` starts in insertion order.
            view.sort_by(|&a, &b| sort.compare(&entries[a].book, &entries[b].book));
        }
        self.view = view;
    }
}
