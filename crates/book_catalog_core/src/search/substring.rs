//! Case-insensitive substring search over book fields.
//!
//! # Invariants
//! - Matching is plain containment after lowercasing both sides; there is no
//!   ranking or tokenization.
//! - An empty term matches every record.
//! - Results keep the input order.

use crate::model::book::BookRecord;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Field(s) a search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
    Isbn,
    /// Title, author or ISBN.
    Any,
}

impl SearchField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Isbn => "isbn",
            Self::Any => "any",
        }
    }
}

impl Display for SearchField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "isbn" => Ok(Self::Isbn),
            "any" | "all" => Ok(Self::Any),
            other => Err(format!(
                "unsupported search field `{other}`; expected title|author|isbn|any"
            )),
        }
    }
}

/// Returns whether `record` matches an already-lowercased `needle`.
pub fn record_matches(record: &BookRecord, needle: &str, field: SearchField) -> bool {
    if needle.is_empty() {
        return true;
    }

    let contains = |value: &str| value.to_lowercase().contains(needle);
    let isbn = record.isbn.as_deref().unwrap_or("");

    match field {
        SearchField::Title => contains(&record.title),
        SearchField::Author => contains(&record.author),
        SearchField::Isbn => contains(isbn),
        SearchField::Any => contains(&record.title) || contains(&record.author) || contains(isbn),
    }
}

/// Filters `records` down to the ones whose `field` contains `term`.
pub fn filter_records<'a>(
    records: impl IntoIterator<Item = &'a BookRecord>,
    term: &str,
    field: SearchField,
) -> Vec<BookRecord> {
    let needle = term.to_lowercase();
    records
        .into_iter()
        .filter(|record| record_matches(record, &needle, field))
        .cloned()
        .collect()
}
