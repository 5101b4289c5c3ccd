//! Catalog construction settings.
//!
//! # Responsibility
//! - Describe which backend a catalog uses and which consistency mode it runs.
//! - Build a ready-to-use store from that description.
//!
//! # Invariants
//! - A store runs exactly one consistency mode for its whole lifetime.

use crate::backend::{CatalogBackend, SnapshotBackend, SqliteBackend};
use crate::store::{CatalogResult, CatalogStore};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// Consistency rule enforced by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyMode {
    /// Non-empty ISBNs are unique across live records.
    UniqueIsbn,
    /// Read status is tracked; missing status is stored as unread.
    #[default]
    ReadStatus,
}

impl ConsistencyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UniqueIsbn => "unique_isbn",
            Self::ReadStatus => "read_status",
        }
    }
}

impl Display for ConsistencyMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsistencyMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "isbn" | "unique_isbn" => Ok(Self::UniqueIsbn),
            "read" | "read_status" => Ok(Self::ReadStatus),
            other => Err(format!(
                "unsupported consistency mode `{other}`; expected isbn|read"
            )),
        }
    }
}

/// Backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// JSON document rewritten on every mutation.
    Snapshot { path: PathBuf },
    /// SQLite database file.
    Sqlite { path: PathBuf },
    /// Private SQLite database that lives as long as the store.
    SqliteInMemory,
}

/// Full catalog construction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub mode: ConsistencyMode,
}

impl CatalogConfig {
    pub fn snapshot(path: impl Into<PathBuf>, mode: ConsistencyMode) -> Self {
        Self {
            backend: BackendConfig::Snapshot { path: path.into() },
            mode,
        }
    }

    pub fn sqlite(path: impl Into<PathBuf>, mode: ConsistencyMode) -> Self {
        Self {
            backend: BackendConfig::Sqlite { path: path.into() },
            mode,
        }
    }
}

/// Dynamically dispatched store produced by [`open_catalog`].
pub type DynCatalogStore = CatalogStore<Box<dyn CatalogBackend>>;

/// Builds the configured backend and opens a store over it.
///
/// # Errors
/// - `Persistence` when the backend cannot be opened or read.
pub fn open_catalog(config: &CatalogConfig) -> CatalogResult<DynCatalogStore> {
    let backend: Box<dyn CatalogBackend> = match &config.backend {
        BackendConfig::Snapshot { path } => Box::new(SnapshotBackend::new(path.clone())),
        BackendConfig::Sqlite { path } => Box::new(SqliteBackend::open(path)?),
        BackendConfig::SqliteInMemory => Box::new(SqliteBackend::open_in_memory()?),
    };
    CatalogStore::open(backend, config.mode)
}
