//! SQLite storage bootstrap for the relational catalog backend.
//!
//! # Responsibility
//! - Open and configure SQLite connections.
//! - Create the `books` schema and stamp its version.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Databases stamped with a newer version than this binary knows are
//!   rejected; no migration is attempted.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or preparing a catalog database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was stamped by a newer catalog build; it is left untouched.
    SchemaTooNew { found: u32, readable_up_to: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew {
                found,
                readable_up_to,
            } => write!(
                f,
                "book catalog schema v{found} was written by a newer build; this build reads up to v{readable_up_to}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
