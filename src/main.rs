//! Binary entry point: resolve configuration, start file logging, open the
//! SQLite catalog, and drive the Ratatui event loop until the user exits.
use anyhow::Context;
use log::info;
use my_book_store::{init_logging, run_app, App, Catalog, Config, SqliteBookRepository};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let _logger = init_logging(config.log_level, &config.log_dir)?;

    let repo = SqliteBookRepository::open(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let catalog = Catalog::load(repo).context("failed to load the catalog")?;
    info!(
        "event=startup module=main status=ok books={} db={}",
        catalog.len(),
        config.db_path.display()
    );

    let mut app = App::new(catalog);
    run_app(&mut app)
}
