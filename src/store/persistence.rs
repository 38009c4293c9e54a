//! Boundary between the in-memory catalog and durable storage.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Book;

use super::records::BookHandle;

/// A book as read back from durable storage, tagged with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBook {
    pub id: i64,
    pub book: Book,
}

/// Everything that changed in memory since the last successful commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Records that have never been written; the handle comes back in the
    /// receipt paired with the row id the backing store assigned.
    pub inserted: Vec<(BookHandle, Book)>,
    pub updated: Vec<(i64, Book)>,
    pub deleted: Vec<i64>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Number of individual record operations in the set.
    pub fn len(&self) -> usize {
        self.inserted.len() + self.updated.len() + self.deleted.len()
    }
}

/// Row ids assigned to inserted records during a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    pub inserted: Vec<(BookHandle, i64)>,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to create data directory {}", .path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open book database at {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to prepare the books table")]
    Schema(#[source] rusqlite::Error),
    #[error("failed to load books")]
    Load(#[source] rusqlite::Error),
    #[error("the database rejected the save")]
    Commit(#[source] rusqlite::Error),
    #[error("book #{0} no longer exists in the database")]
    MissingRecord(i64),
}

/// Durable storage for the catalog. The store only ever loads everything at
/// startup and commits batches of changes on demand.
pub trait BookRepository {
    fn load_all(&self) -> Result<Vec<StoredBook>, PersistenceError>;

    /// Apply `changes` atomically: either every operation lands or none do.
    fn commit(&mut self, changes: &ChangeSet) -> Result<CommitReceipt, PersistenceError>;
}
