//! Catalog search entry points.
//!
//! # Responsibility
//! - Define searchable fields and substring match semantics.
//! - Keep result shaping inside core.

pub mod substring;
