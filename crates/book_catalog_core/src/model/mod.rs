//! Catalog domain model.
//!
//! # Responsibility
//! - Define the canonical book record owned by the catalog store.
//! - Keep ISBN-bearing and read-status records in one fixed shape.
//!
//! # Invariants
//! - Every committed record is identified by a stable `BookId`.
//! - Deletion is a hard delete; ids are never handed out twice per store.

pub mod book;
