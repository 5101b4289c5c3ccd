//! Read/unread aggregate over the catalog.

use crate::model::book::BookRecord;
use std::fmt::{Display, Formatter};

/// Computed catalog totals. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogStatistics {
    pub total: usize,
    pub read_count: usize,
    /// `100 * read_count / total`, or `0.0` for an empty catalog.
    pub read_percentage: f64,
}

impl CatalogStatistics {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a BookRecord>) -> Self {
        let (total, read_count) = records
            .into_iter()
            .fold((0_usize, 0_usize), |(total, read), record| {
                (total + 1, read + usize::from(record.is_read()))
            });

        let read_percentage = if total == 0 {
            0.0
        } else {
            read_count as f64 * 100.0 / total as f64
        };

        Self {
            total,
            read_count,
            read_percentage,
        }
    }

    /// Percentage rounded to one decimal place, as shown to users.
    pub fn rounded_percentage(&self) -> f64 {
        (self.read_percentage * 10.0).round() / 10.0
    }
}

impl Display for CatalogStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total books: {}", self.total)?;
        write!(f, "Percentage read: {:.1}%", self.read_percentage)
    }
}
