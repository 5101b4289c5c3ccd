//! Catalog store implementation.
//!
//! # Responsibility
//! - Validate and normalize caller fields before any write.
//! - Serialize mutations and their persist step behind one writer lock.
//! - Answer get/list/search/statistics from the committed record set.
//!
//! # Invariants
//! - The ISBN check and the backend write run under the same writer lock.
//! - Readers only ever see the last durable record set; a failed persist
//!   leaves it unchanged.
//! - Ids come from a monotonic counter (snapshot) or the backend's surrogate
//!   key (relational) and are never reused by this store instance.

use super::statistics::CatalogStatistics;
use super::{CatalogError, CatalogResult};
use crate::backend::{BackendError, BackendKind, CatalogBackend};
use crate::config::ConsistencyMode;
use crate::model::book::{BookFields, BookId, BookRecord};
use crate::search::substring::{filter_records, SearchField};
use log::{debug, error, info, warn};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard};
use std::time::Instant;

/// Key used by [`CatalogStore::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveKey {
    /// Case-insensitive exact title match; first match in store order.
    Title(String),
    Id(BookId),
}

struct Writer<B> {
    backend: B,
    next_id: i64,
}

/// Thread-safe catalog over a persistence backend.
///
/// Mutations are serialized; reads run concurrently with each other and never
/// observe a half-applied mutation.
pub struct CatalogStore<B: CatalogBackend> {
    mode: ConsistencyMode,
    backend_kind: BackendKind,
    writer: Mutex<Writer<B>>,
    records: RwLock<Vec<BookRecord>>,
    recovered_from: Option<CatalogError>,
}

impl<B: CatalogBackend> CatalogStore<B> {
    /// Loads the catalog from `backend`.
    ///
    /// A corrupt snapshot document is logged and replaced by an empty catalog;
    /// the error stays available through [`CatalogStore::recovered_from`].
    ///
    /// # Errors
    /// - `CorruptState` when a relational row cannot be decoded.
    /// - `Persistence` when the backend cannot be read for any other reason.
    pub fn open(mut backend: B, mode: ConsistencyMode) -> CatalogResult<Self> {
        let started_at = Instant::now();
        let backend_kind = backend.kind();

        let (records, recovered_from) = match backend.load_all() {
            Ok(records) => (records, None),
            Err(BackendError::Corrupt(message)) if backend_kind == BackendKind::Snapshot => {
                error!(
                    "event=catalog_open module=store status=degraded backend={} error_code=corrupt_state error={}",
                    backend_kind.as_str(),
                    message
                );
                (Vec::new(), Some(CatalogError::CorruptState(message)))
            }
            Err(err) => {
                error!(
                    "event=catalog_open module=store status=error backend={} duration_ms={} error={}",
                    backend_kind.as_str(),
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(match err {
                    // Rows stay durable and indexed; an empty view would diverge from them.
                    BackendError::Corrupt(message) => CatalogError::CorruptState(message),
                    other => CatalogError::Persistence(other),
                });
            }
        };

        report_loaded_anomalies(&records, mode);

        let next_id = records.iter().map(|record| record.id.get()).max().unwrap_or(0) + 1;
        info!(
            "event=catalog_open module=store status=ok backend={} mode={} records={} duration_ms={}",
            backend_kind.as_str(),
            mode.as_str(),
            records.len(),
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            mode,
            backend_kind,
            writer: Mutex::new(Writer { backend, next_id }),
            records: RwLock::new(records),
            recovered_from,
        })
    }

    pub fn mode(&self) -> ConsistencyMode {
        self.mode
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend_kind
    }

    /// Returns the corruption this store degraded from at open time, if any.
    pub fn recovered_from(&self) -> Option<&CatalogError> {
        self.recovered_from.as_ref()
    }

    /// Validates and persists a new record.
    ///
    /// # Errors
    /// - `Validation` for empty title/author or an out-of-range year.
    /// - `Conflict` when ISBN uniqueness is enabled and the ISBN is taken.
    /// - `Persistence` when the backend write fails; nothing is added.
    pub fn add(&self, fields: BookFields) -> CatalogResult<BookRecord> {
        let fields = self.prepare_fields(fields)?;
        let mut writer = self.lock_writer()?;
        let mut next = self.read_records()?.clone();

        if let Some(isbn) = self.unique_isbn(&fields) {
            if next.iter().any(|record| record.isbn_key() == Some(isbn)) {
                debug!("event=book_add module=store status=rejected reason=isbn_conflict");
                return Err(CatalogError::Conflict {
                    isbn: isbn.to_string(),
                });
            }
        }

        let proposed = BookId::new(writer.next_id);
        next.push(BookRecord::from_fields(proposed, fields));
        let last = next.len() - 1;

        let committed = match writer.backend.insert(&next[last], &next) {
            Ok(id) => id,
            Err(err) => return Err(self.write_failed("book_add", err)),
        };
        next[last].id = committed;
        writer.next_id = writer.next_id.max(committed.get() + 1);

        let record = next[last].clone();
        self.commit(next)?;
        info!(
            "event=book_add module=store status=ok backend={} id={}",
            self.backend_kind.as_str(),
            record.id
        );
        Ok(record)
    }

    /// Replaces every field of record `id`.
    ///
    /// # Errors
    /// - `Validation` as for [`CatalogStore::add`].
    /// - `NotFound` when `id` does not exist.
    /// - `Conflict` when the new ISBN belongs to a different record.
    /// - `Persistence` when the backend write fails; the record is unchanged.
    pub fn update(&self, id: BookId, fields: BookFields) -> CatalogResult<BookRecord> {
        let fields = self.prepare_fields(fields)?;
        let mut writer = self.lock_writer()?;
        let mut next = self.read_records()?.clone();

        let index = next
            .iter()
            .position(|record| record.id == id)
            .ok_or(CatalogError::NotFound(id))?;

        if let Some(isbn) = self.unique_isbn(&fields) {
            let taken = next
                .iter()
                .any(|record| record.id != id && record.isbn_key() == Some(isbn));
            if taken {
                debug!(
                    "event=book_update module=store status=rejected reason=isbn_conflict id={id}"
                );
                return Err(CatalogError::Conflict {
                    isbn: isbn.to_string(),
                });
            }
        }

        next[index] = BookRecord::from_fields(id, fields);
        if let Err(err) = writer.backend.update(&next[index], &next) {
            return Err(self.write_failed("book_update", err));
        }

        let record = next[index].clone();
        self.commit(next)?;
        info!(
            "event=book_update module=store status=ok backend={} id={}",
            self.backend_kind.as_str(),
            id
        );
        Ok(record)
    }

    /// Removes the first record matching `key`.
    ///
    /// Returns `Ok(false)` without touching the backend when nothing matches.
    pub fn remove(&self, key: &RemoveKey) -> CatalogResult<bool> {
        let mut writer = self.lock_writer()?;
        let mut next = self.read_records()?.clone();

        let index = match key {
            RemoveKey::Title(title) => {
                let wanted = title.to_lowercase();
                next.iter()
                    .position(|record| record.title.to_lowercase() == wanted)
            }
            RemoveKey::Id(id) => next.iter().position(|record| record.id == *id),
        };
        let Some(index) = index else {
            debug!("event=book_remove module=store status=noop reason=not_found");
            return Ok(false);
        };

        let removed = next.remove(index);
        match writer.backend.delete(removed.id, &next) {
            Ok(()) => {}
            Err(BackendError::NotFound(id)) => {
                warn!(
                    "event=book_remove module=store status=converged backend={} id={} reason=row_already_absent",
                    self.backend_kind.as_str(),
                    id
                );
            }
            Err(err) => return Err(self.write_failed("book_remove", err)),
        }

        self.commit(next)?;
        info!(
            "event=book_remove module=store status=ok backend={} id={}",
            self.backend_kind.as_str(),
            removed.id
        );
        Ok(true)
    }

    /// Gets one record by id.
    pub fn get(&self, id: BookId) -> CatalogResult<BookRecord> {
        self.read_records()?
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    /// Lists every record in store order.
    pub fn list(&self) -> CatalogResult<Vec<BookRecord>> {
        Ok(self.read_records()?.clone())
    }

    /// Case-insensitive substring search; an empty term returns everything.
    pub fn search(&self, term: &str, field: SearchField) -> CatalogResult<Vec<BookRecord>> {
        let records = self.read_records()?;
        Ok(filter_records(records.iter(), term, field))
    }

    /// Computes total and read counts over the current catalog.
    pub fn statistics(&self) -> CatalogResult<CatalogStatistics> {
        let records = self.read_records()?;
        Ok(CatalogStatistics::from_records(records.iter()))
    }

    fn prepare_fields(&self, mut fields: BookFields) -> CatalogResult<BookFields> {
        fields.validate()?;
        if fields.isbn_key().is_none() {
            fields.isbn = None;
        }
        if self.mode == ConsistencyMode::ReadStatus && fields.read.is_none() {
            fields.read = Some(false);
        }
        Ok(fields)
    }

    fn unique_isbn<'a>(&self, fields: &'a BookFields) -> Option<&'a str> {
        match self.mode {
            ConsistencyMode::UniqueIsbn => fields.isbn_key(),
            ConsistencyMode::ReadStatus => None,
        }
    }

    fn write_failed(&self, event: &'static str, err: BackendError) -> CatalogError {
        match err {
            BackendError::Conflict { isbn } => {
                debug!(
                    "event={event} module=store status=rejected reason=backend_isbn_conflict backend={}",
                    self.backend_kind.as_str()
                );
                CatalogError::Conflict { isbn }
            }
            BackendError::NotFound(id) => CatalogError::NotFound(id),
            other => {
                error!(
                    "event={event} module=store status=error backend={} error_code=persist_failed error={}",
                    self.backend_kind.as_str(),
                    other
                );
                CatalogError::Persistence(other)
            }
        }
    }

    fn commit(&self, next: Vec<BookRecord>) -> CatalogResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| CatalogError::LockPoisoned("records"))?;
        *records = next;
        Ok(())
    }

    fn lock_writer(&self) -> CatalogResult<MutexGuard<'_, Writer<B>>> {
        self.writer
            .lock()
            .map_err(|_| CatalogError::LockPoisoned("writer"))
    }

    fn read_records(&self) -> CatalogResult<RwLockReadGuard<'_, Vec<BookRecord>>> {
        self.records
            .read()
            .map_err(|_| CatalogError::LockPoisoned("records"))
    }
}

fn report_loaded_anomalies(records: &[BookRecord], mode: ConsistencyMode) {
    let invalid = records
        .iter()
        .filter(|record| record.to_fields().validate().is_err())
        .count();
    if invalid > 0 {
        warn!("event=catalog_open module=store status=warn invalid_records={invalid}");
    }

    if mode == ConsistencyMode::UniqueIsbn {
        let mut seen = std::collections::HashSet::new();
        let duplicates = records
            .iter()
            .filter_map(BookRecord::isbn_key)
            .filter(|isbn| !seen.insert(*isbn))
            .count();
        if duplicates > 0 {
            warn!("event=catalog_open module=store status=warn duplicate_isbns={duplicates}");
        }
    }
}
