//! SQLite persistence for the catalog.

mod books;
mod connection;

pub use books::SqliteBookRepository;
pub use connection::{ensure_schema, open_database, open_in_memory};
