//! SQLite-backed `BookRepository`.

use std::path::Path;

use log::debug;
use rusqlite::{params, Connection, Transaction};

use crate::models::Book;
use crate::store::{BookRepository, ChangeSet, CommitReceipt, PersistenceError, StoredBook};

use super::connection::{open_database, open_in_memory};

/// `BookRepository` over a single SQLite connection.
pub struct SqliteBookRepository {
    conn: Connection,
}

impl SqliteBookRepository {
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    pub fn in_memory() -> Result<Self, PersistenceError> {
        Ok(Self {
            conn: open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl BookRepository for SqliteBookRepository {
    /// Rows come back in id order, which is the order they were created in.
    fn load_all(&self) -> Result<Vec<StoredBook>, PersistenceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, author, year, note FROM books ORDER BY id")
            .map_err(PersistenceError::Load)?;

        let books = stmt
            .query_map([], |row| {
                Ok(StoredBook {
                    id: row.get(0)?,
                    book: Book {
                        title: row.get(1)?,
                        author: row.get(2)?,
                        year: row.get(3)?,
                        note: row.get(4)?,
                    },
                })
            })
            .map_err(PersistenceError::Load)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(PersistenceError::Load)?;

        Ok(books)
    }

    /// Deletes, updates, then inserts inside one transaction. Any failure
    /// drops the transaction, which rolls everything back.
    fn commit(&mut self, changes: &ChangeSet) -> Result<CommitReceipt, PersistenceError> {
        let tx = self.conn.transaction().map_err(PersistenceError::Commit)?;

        for id in &changes.deleted {
            let deleted = tx
                .execute("DELETE FROM books WHERE id = ?1", params![id])
                .map_err(PersistenceError::Commit)?;
            if deleted == 0 {
                debug!("event=book_delete module=db status=skipped reason=missing id={id}");
            }
        }

        for (id, book) in &changes.updated {
            update_book(&tx, *id, book)?;
        }

        let mut receipt = CommitReceipt::default();
        for (handle, book) in &changes.inserted {
            let id = insert_book(&tx, book)?;
            receipt.inserted.push((*handle, id));
        }

        tx.commit().map_err(PersistenceError::Commit)?;
        Ok(receipt)
    }
}

fn insert_book(tx: &Transaction<'_>, book: &Book) -> Result<i64, PersistenceError> {
    tx.execute(
        "INSERT INTO books (title, author, year, note) VALUES (?1, ?2, ?3, ?4)",
        params![book.title, book.author, book.year, book.note],
    )
    .map_err(PersistenceError::Commit)?;
    Ok(tx.last_insert_rowid())
}

/// Overwrite every field of an existing row. Touching zero rows means the
/// record vanished underneath us, which rejects the whole save.
fn update_book(tx: &Transaction<'_>, id: i64, book: &Book) -> Result<(), PersistenceError> {
    let updated = tx
        .execute(
            "UPDATE books SET title = ?1, author = ?2, year = ?3, note = ?4 WHERE id = ?5",
            params![book.title, book.author, book.year, book.note, id],
        )
        .map_err(PersistenceError::Commit)?;

    if updated == 0 {
        Err(PersistenceError::MissingRecord(id))
    } else {
        Ok(())
    }
}
