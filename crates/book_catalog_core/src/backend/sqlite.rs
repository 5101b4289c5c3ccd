//! SQLite row-per-record backend.
//!
//! # Responsibility
//! - Persist each book as one row of the `books` table.
//! - Surface the storage-level ISBN uniqueness constraint as a typed conflict.
//!
//! # Invariants
//! - `id` is an `AUTOINCREMENT` surrogate key, so deleted ids are never
//!   reassigned.
//! - The unique index on non-empty `isbn` is the authoritative conflict check.
//! - Absent ISBN is stored as `''` and read back as `None`.
//! - Read paths reject invalid persisted state instead of masking it.

use super::{BackendError, BackendKind, BackendResult, CatalogBackend};
use crate::db::schema::{current_user_version, SCHEMA_VERSION};
use crate::db::{open_db, open_db_in_memory};
use crate::model::book::{BookId, BookRecord};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::path::Path;

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    isbn,
    publication_year,
    genre,
    read
FROM books";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "title",
    "author",
    "isbn",
    "publication_year",
    "genre",
    "read",
];

/// SQLite-backed catalog storage.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens (or creates) a database file with the catalog schema applied.
    pub fn open(path: impl AsRef<Path>) -> BackendResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory database with the catalog schema applied.
    pub fn open_in_memory() -> BackendResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps an existing connection after checking its schema.
    ///
    /// # Errors
    /// - `MissingSchema` when the connection was not bootstrapped through
    ///   [`crate::db::open_db`] or lacks a required `books` column.
    pub fn try_new(conn: Connection) -> BackendResult<Self> {
        let version = current_user_version(&conn)?;
        if version != SCHEMA_VERSION {
            return Err(BackendError::MissingSchema(format!(
                "expected schema version {SCHEMA_VERSION}, found {version}"
            )));
        }

        let columns = table_columns(&conn, "books")?;
        if columns.is_empty() {
            return Err(BackendError::MissingSchema(
                "table `books` does not exist".to_string(),
            ));
        }
        for required in REQUIRED_COLUMNS {
            if !columns.iter().any(|column| column == required) {
                return Err(BackendError::MissingSchema(format!(
                    "table `books` is missing column `{required}`"
                )));
            }
        }

        Ok(Self { conn })
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl CatalogBackend for SqliteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Relational
    }

    fn load_all(&mut self) -> BackendResult<Vec<BookRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }

    fn insert(&mut self, record: &BookRecord, _catalog: &[BookRecord]) -> BackendResult<BookId> {
        self.conn
            .execute(
                "INSERT INTO books (
                    title,
                    author,
                    isbn,
                    publication_year,
                    genre,
                    read
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    record.title.as_str(),
                    record.author.as_str(),
                    isbn_to_db(record),
                    record.publication_year,
                    record.genre.as_str(),
                    record.read.map(bool_to_int),
                ],
            )
            .map_err(|err| map_write_error(err, record))?;

        Ok(BookId::new(self.conn.last_insert_rowid()))
    }

    fn update(&mut self, record: &BookRecord, _catalog: &[BookRecord]) -> BackendResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE books
                 SET
                    title = ?1,
                    author = ?2,
                    isbn = ?3,
                    publication_year = ?4,
                    genre = ?5,
                    read = ?6
                 WHERE id = ?7;",
                params![
                    record.title.as_str(),
                    record.author.as_str(),
                    isbn_to_db(record),
                    record.publication_year,
                    record.genre.as_str(),
                    record.read.map(bool_to_int),
                    record.id.get(),
                ],
            )
            .map_err(|err| map_write_error(err, record))?;

        if changed == 0 {
            return Err(BackendError::NotFound(record.id));
        }

        Ok(())
    }

    fn delete(&mut self, id: BookId, _catalog: &[BookRecord]) -> BackendResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1;", [id.get()])?;

        if changed == 0 {
            return Err(BackendError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_book_row(row: &Row<'_>) -> BackendResult<BookRecord> {
    let id = BookId::new(row.get("id")?);

    let isbn: String = row.get("isbn")?;
    let isbn = if isbn.is_empty() { None } else { Some(isbn) };

    let read = match row.get::<_, Option<i64>>("read")? {
        None => None,
        Some(0) => Some(false),
        Some(1) => Some(true),
        Some(other) => {
            return Err(BackendError::Corrupt(format!(
                "invalid read value `{other}` in books.read for id {id}"
            )));
        }
    };

    Ok(BookRecord {
        id,
        title: row.get("title")?,
        author: row.get("author")?,
        isbn,
        publication_year: row.get("publication_year")?,
        genre: row.get("genre")?,
        read,
    })
}

fn table_columns(conn: &Connection, table: &str) -> BackendResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let mut rows = stmt.query([table])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get(0)?);
    }
    Ok(columns)
}

fn map_write_error(err: rusqlite::Error, record: &BookRecord) -> BackendError {
    if is_unique_violation(&err) {
        return BackendError::Conflict {
            isbn: record.isbn_key().unwrap_or_default().to_string(),
        };
    }
    err.into()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

fn isbn_to_db(record: &BookRecord) -> &str {
    record.isbn_key().unwrap_or("")
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
