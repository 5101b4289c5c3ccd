//! Core catalog logic for the personal book catalog.
//! This crate is the single source of truth for record identity, validation
//! and ISBN uniqueness.

pub mod backend;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod search;
pub mod store;

pub use backend::{
    BackendError, BackendKind, BackendResult, CatalogBackend, SnapshotBackend, SqliteBackend,
};
pub use config::{open_catalog, BackendConfig, CatalogConfig, ConsistencyMode, DynCatalogStore};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::book::{BookFields, BookId, BookRecord, BookValidationError, YEAR_MAX, YEAR_MIN};
pub use search::substring::SearchField;
pub use store::{CatalogError, CatalogResult, CatalogStatistics, CatalogStore, RemoveKey};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
