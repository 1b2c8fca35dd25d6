//! Runtime configuration.
//!
//! Settings come from command-line overrides first, then environment
//! variables, then defaults. Lookup is injectable so tests never touch the
//! process environment.

use camino::Utf8PathBuf;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Selects the storage backend.
pub const STORAGE_ENV: &str = "TIMEKEEPER_STORAGE";
/// Overrides the journal data directory.
pub const DATA_DIR_ENV: &str = "TIMEKEEPER_DATA_DIR";
/// Connection string for the `PostgreSQL` backend.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Log filter directives.
pub const LOG_ENV: &str = "TIMEKEEPER_LOG";
/// Log filter used when [`LOG_ENV`] is unset.
pub const DEFAULT_LOG_FILTER: &str = "timekeeper=info";

const DATA_DIR_NAME: &str = "timekeeper";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The storage name is not recognised.
    #[error("unknown storage backend '{0}', expected memory, journal or postgres")]
    UnknownStorage(String),
    /// The `PostgreSQL` backend was selected without a connection string.
    #[error("the postgres backend needs --database-url or DATABASE_URL")]
    MissingDatabaseUrl,
    /// No data directory was given and the platform has no default.
    #[error("no data directory available, set --data-dir or TIMEKEEPER_DATA_DIR")]
    NoDataDir,
    /// The platform data directory is not valid UTF-8.
    #[error("data directory {} is not valid UTF-8", .0.display())]
    NonUtf8DataDir(PathBuf),
}

/// Storage backend names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Records live only as long as the process.
    Memory,
    /// JSON journal in a data directory.
    #[default]
    Journal,
    /// `PostgreSQL` database.
    Postgres,
}

impl StorageKind {
    /// Returns the name accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Journal => "journal",
            Self::Postgres => "postgres",
        }
    }
}

impl FromStr for StorageKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "journal" => Ok(Self::Journal),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(ConfigError::UnknownStorage(value.to_owned())),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-memory store.
    Memory,
    /// Journal store rooted at `dir`.
    Journal {
        /// Data directory holding the journal.
        dir: Utf8PathBuf,
    },
    /// `PostgreSQL` store.
    Postgres {
        /// Connection string.
        url: String,
    },
}

/// Values supplied on the command line. `None` defers to the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Storage backend.
    pub storage: Option<StorageKind>,
    /// Journal data directory.
    pub data_dir: Option<Utf8PathBuf>,
    /// `PostgreSQL` connection string.
    pub database_url: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Storage backend.
    pub storage: StorageBackend,
    /// Log filter directives.
    pub log_filter: String,
}

impl TrackerConfig {
    /// Resolves configuration from `overrides` and the process environment.
    ///
    /// # Errors
    ///
    /// See [`Self::from_lookup`].
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves configuration from `overrides` and `lookup`. Empty values
    /// count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStorage`] for an unrecognised backend,
    /// [`ConfigError::MissingDatabaseUrl`] when `PostgreSQL` is selected
    /// without a URL, and [`ConfigError::NoDataDir`] or
    /// [`ConfigError::NonUtf8DataDir`] when the journal has no usable
    /// directory.
    pub fn from_lookup(
        overrides: ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let kind = match overrides.storage {
            Some(kind) => kind,
            None => read(STORAGE_ENV)
                .map(|value| value.parse())
                .transpose()?
                .unwrap_or_default(),
        };

        let storage = match kind {
            StorageKind::Memory => StorageBackend::Memory,
            StorageKind::Journal => {
                let configured = overrides
                    .data_dir
                    .or_else(|| read(DATA_DIR_ENV).map(Utf8PathBuf::from));
                let dir = match configured {
                    Some(dir) => dir,
                    None => default_data_dir()?,
                };
                StorageBackend::Journal { dir }
            }
            StorageKind::Postgres => StorageBackend::Postgres {
                url: overrides
                    .database_url
                    .or_else(|| read(DATABASE_URL_ENV))
                    .ok_or(ConfigError::MissingDatabaseUrl)?,
            },
        };

        Ok(Self {
            storage,
            log_filter: read(LOG_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
        })
    }
}

fn default_data_dir() -> Result<Utf8PathBuf, ConfigError> {
    let base = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
    let utf8 = Utf8PathBuf::from_path_buf(base).map_err(ConfigError::NonUtf8DataDir)?;
    Ok(utf8.join(DATA_DIR_NAME))
}
