//! Catalog store: the single authority over book records.
//!
//! # Responsibility
//! - Own record identity, validation and the ISBN uniqueness invariant.
//! - Translate catalog operations into backend calls.
//!
//! # Invariants
//! - A mutation is visible to readers only after its backend write succeeded.
//! - Validation, conflict and not-found errors leave state untouched.

use crate::backend::BackendError;
use crate::model::book::{BookId, BookValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod catalog_store;
pub mod statistics;

pub use catalog_store::{CatalogStore, RemoveKey};
pub use statistics::CatalogStatistics;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error surfaced by catalog store operations.
#[derive(Debug)]
pub enum CatalogError {
    /// A required field is empty or a numeric field is out of range.
    Validation(BookValidationError),
    /// The ISBN is already used by another record.
    Conflict { isbn: String },
    /// No record with this id exists.
    NotFound(BookId),
    /// Persisted catalog could not be decoded at load time.
    CorruptState(String),
    /// The durable write or read failed; the operation was not applied.
    Persistence(BackendError),
    /// A previous holder of the named lock panicked.
    LockPoisoned(&'static str),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict { isbn } => write!(f, "a book with isbn `{isbn}` already exists"),
            Self::NotFound(id) => write!(f, "book not found: {id}"),
            Self::CorruptState(message) => write!(f, "corrupt catalog state: {message}"),
            Self::Persistence(err) => write!(f, "failed to persist catalog: {err}"),
            Self::LockPoisoned(name) => write!(f, "catalog {name} lock poisoned"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for CatalogError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<BackendError> for CatalogError {
    fn from(value: BackendError) -> Self {
        match value {
            BackendError::Conflict { isbn } => Self::Conflict { isbn },
            BackendError::NotFound(id) => Self::NotFound(id),
            BackendError::Corrupt(message) => Self::CorruptState(message),
            other => Self::Persistence(other),
        }
    }
}
