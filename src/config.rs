use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

use crate::logging::{default_log_level, normalize_level};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".my-book-store";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "books.sqlite";
const LOG_DIR_NAME: &str = "logs";

/// Overrides the data directory.
pub const HOME_ENV: &str = "BOOK_STORE_HOME";
/// Overrides the log level.
pub const LOG_ENV: &str = "BOOK_STORE_LOG";

/// Where the catalog lives on disk and how chatty the log file is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: &'static str,
}

impl Config {
    /// Resolve the configuration from the environment, falling back to
    /// `~/.my-book-store`.
    pub fn from_env() -> Result<Self> {
        let data_dir = match env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        let level = match env::var(LOG_ENV) {
            Ok(level) if !level.trim().is_empty() => normalize_level(&level)?,
            _ => default_log_level(),
        };
        Ok(Self::with_data_dir(&data_dir, level))
    }

    /// Lay out the database and log directory beneath `data_dir`.
    pub fn with_data_dir(data_dir: &Path, log_level: &'static str) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            db_path: data_dir.join(DB_FILE_NAME),
            log_dir: data_dir.join(LOG_DIR_NAME),
            log_level,
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
