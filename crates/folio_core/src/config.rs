//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Describe storage, asset, and logging locations in one serde model.
//! - Fill omitted fields with defaults so partial JSON files stay valid.
//! - Turn a loaded config into the store, asset and logging handles it names.

use crate::asset::{LocalAssetStore, DEFAULT_ASSET_URL_PREFIX};
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{default_log_level, init_logging, LoggingError};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Config file loading failures.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// SQLite database file; `None` selects an in-memory database.
    pub db_path: Option<PathBuf>,
    pub asset_dir: PathBuf,
    /// URL prefix written into records for uploaded assets.
    pub asset_url_prefix: String,
    pub log_level: String,
    /// Absolute log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            asset_dir: PathBuf::from("uploads"),
            asset_url_prefix: DEFAULT_ASSET_URL_PREFIX.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl FolioConfig {
    /// Parses configuration from JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads and parses a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Starts file logging when `log_dir` is set; returns whether it did.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match &self.log_dir {
            Some(dir) => init_logging(&self.log_level, dir).map(|()| true),
            None => Ok(false),
        }
    }

    /// Opens `db_path`, or an in-memory store when it is unset.
    pub fn open_database(&self) -> DbResult<Connection> {
        match &self.db_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }

    /// Asset store rooted at `asset_dir` that hands out `asset_url_prefix` URLs.
    pub fn asset_store(&self) -> LocalAssetStore {
        LocalAssetStore::with_url_prefix(&self.asset_dir, &self.asset_url_prefix)
    }
}
