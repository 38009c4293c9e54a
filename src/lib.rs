//! Core library surface for the My Book Store TUI application.
//!
//! `store` holds the catalog logic and has no terminal dependencies, `db`
//! persists it to SQLite, and `ui` drives it from the keyboard. The binary
//! only wires these together.
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod store;
pub mod ui;

pub use config::Config;
pub use db::SqliteBookRepository;
pub use logging::init_logging;
pub use models::{Book, SortError, SortKey};
pub use store::{BookRepository, Catalog, PersistenceError, Selection, SortState};
pub use ui::{run_app, App};
