//! Persistence backends for the catalog store.
//!
//! # Responsibility
//! - Define the single write/read contract the store drives.
//! - Isolate file-format and SQL details from store orchestration.
//!
//! # Invariants
//! - Every write method receives the full post-mutation catalog so that
//!   snapshot-style backends can rewrite the whole document.
//! - Backends never validate record fields; the store does.
//! - A backend uniqueness conflict is reported as `BackendError::Conflict`.

use crate::db::DbError;
use crate::model::book::{BookId, BookRecord};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod snapshot;
pub mod sqlite;

pub use snapshot::SnapshotBackend;
pub use sqlite::SqliteBackend;

pub type BackendResult<T> = Result<T, BackendError>;

/// Storage strategy implemented by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Whole catalog rewritten as one document per mutation.
    Snapshot,
    /// One row per record with a storage-level ISBN constraint.
    Relational,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Relational => "relational",
        }
    }
}

/// Error raised by backend reads and writes.
#[derive(Debug)]
pub enum BackendError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Db(DbError),
    /// Persisted state exists but cannot be decoded.
    Corrupt(String),
    /// Storage-level ISBN uniqueness constraint rejected the write.
    Conflict { isbn: String },
    NotFound(BookId),
    /// Connection is missing the schema this backend expects.
    MissingSchema(String),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Json(err) => write!(f, "JSON error: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Corrupt(message) => write!(f, "corrupt catalog state: {message}"),
            Self::Conflict { isbn } => write!(f, "isbn `{isbn}` already exists"),
            Self::NotFound(id) => write!(f, "book not found: {id}"),
            Self::MissingSchema(message) => write!(f, "missing catalog schema: {message}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DbError> for BackendError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable container for the catalog record set.
///
/// The store owns identity and validation; backends only persist what they
/// are handed. Snapshot backends keep the id proposed in `insert`, relational
/// backends return their own surrogate key.
pub trait CatalogBackend: Send {
    fn kind(&self) -> BackendKind;

    /// Loads every persisted record in backend order.
    fn load_all(&mut self) -> BackendResult<Vec<BookRecord>>;

    /// Persists a new record and returns its committed id.
    fn insert(&mut self, record: &BookRecord, catalog: &[BookRecord]) -> BackendResult<BookId>;

    /// Replaces an existing record wholesale.
    fn update(&mut self, record: &BookRecord, catalog: &[BookRecord]) -> BackendResult<()>;

    /// Hard-deletes one record.
    fn delete(&mut self, id: BookId, catalog: &[BookRecord]) -> BackendResult<()>;
}

impl<B: CatalogBackend + ?Sized> CatalogBackend for Box<B> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn load_all(&mut self) -> BackendResult<Vec<BookRecord>> {
        (**self).load_all()
    }

    fn insert(&mut self, record: &BookRecord, catalog: &[BookRecord]) -> BackendResult<BookId> {
        (**self).insert(record, catalog)
    }

    fn update(&mut self, record: &BookRecord, catalog: &[BookRecord]) -> BackendResult<()> {
        (**self).update(record, catalog)
    }

    fn delete(&mut self, id: BookId, catalog: &[BookRecord]) -> BackendResult<()> {
        (**self).delete(id, catalog)
    }
}
