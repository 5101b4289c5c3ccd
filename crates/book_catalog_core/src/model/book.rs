//! Book domain model.
//!
//! # Responsibility
//! - Define the committed record (`BookRecord`) and the caller-supplied
//!   field set (`BookFields`) used by add/update.
//! - Provide field validation shared by every write path.
//!
//! # Invariants
//! - `title` and `author` are non-blank at commit time.
//! - `publication_year`, when present, lies in `[YEAR_MIN, YEAR_MAX]`.
//! - `isbn` comparison is case-sensitive and exact; blank ISBN means absent.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Smallest accepted publication year.
pub const YEAR_MIN: i32 = 1000;
/// Largest accepted publication year.
pub const YEAR_MAX: i32 = 9999;

/// Opaque record identifier assigned by the store or the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for BookId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors for book write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    EmptyTitle,
    EmptyAuthor,
    YearOutOfRange { year: i32 },
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyAuthor => write!(f, "author must not be empty"),
            Self::YearOutOfRange { year } => write!(
                f,
                "publication year {year} is outside {YEAR_MIN}..={YEAR_MAX}"
            ),
        }
    }
}

impl Error for BookValidationError {}

/// Caller-supplied book fields.
///
/// `Update` replaces every field of the target record with these values.
/// Serialized field names match the snapshot document layout (`year`, not
/// `publication_year`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(rename = "year", default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub genre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl BookFields {
    /// Creates a field set with the two required values; everything else empty.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.publication_year = Some(year);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_read(mut self, read: bool) -> Self {
        self.read = Some(read);
        self
    }

    /// Validates required fields and numeric ranges.
    ///
    /// # Errors
    /// - `EmptyTitle` / `EmptyAuthor` when the value is empty or whitespace.
    /// - `YearOutOfRange` when a supplied year falls outside `[1000, 9999]`.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if self.title.trim().is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        if self.author.trim().is_empty() {
            return Err(BookValidationError::EmptyAuthor);
        }
        if let Some(year) = self.publication_year {
            if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
                return Err(BookValidationError::YearOutOfRange { year });
            }
        }
        Ok(())
    }

    /// Returns the ISBN that participates in uniqueness checks.
    ///
    /// Blank values are treated as absent.
    pub fn isbn_key(&self) -> Option<&str> {
        self.isbn.as_deref().filter(|value| !value.trim().is_empty())
    }
}

/// Committed catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    #[serde(rename = "year")]
    pub publication_year: Option<i32>,
    pub genre: String,
    pub read: Option<bool>,
}

impl BookRecord {
    /// Builds a record from validated fields and an assigned id.
    pub fn from_fields(id: BookId, fields: BookFields) -> Self {
        Self {
            id,
            title: fields.title,
            author: fields.author,
            isbn: fields.isbn,
            publication_year: fields.publication_year,
            genre: fields.genre,
            read: fields.read,
        }
    }

    /// Returns the id-less field set of this record.
    pub fn to_fields(&self) -> BookFields {
        BookFields {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn.clone(),
            publication_year: self.publication_year,
            genre: self.genre.clone(),
            read: self.read,
        }
    }

    /// Returns the ISBN that participates in uniqueness checks.
    pub fn isbn_key(&self) -> Option<&str> {
        self.isbn.as_deref().filter(|value| !value.trim().is_empty())
    }

    /// Returns whether the record is marked as read.
    pub fn is_read(&self) -> bool {
        self.read == Some(true)
    }
}
