//! Ratatui front-end: the catalog table, its dialogs, and the terminal loop.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
