//! Whole-document JSON snapshot backend.
//!
//! # Responsibility
//! - Persist the catalog as one list-of-mappings JSON document.
//! - Replace the previous document atomically on every write.
//!
//! # Invariants
//! - Document entries carry `title, author, year, genre, read` (plus `isbn`
//!   when present) and no ids or schema version.
//! - A crash mid-write leaves either the previous or the new document, never
//!   a partial one: writes go to a sibling temp file that is synced and then
//!   renamed over the target.
//! - Ids are assigned `1..=n` in document order at load time.

use super::{BackendError, BackendKind, BackendResult, CatalogBackend};
use crate::model::book::{BookFields, BookId, BookRecord};
use log::{debug, warn};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

const TEMP_SUFFIX: &str = ".tmp";

/// JSON document backend; one file per catalog.
#[derive(Debug, Clone)]
pub struct SnapshotBackend {
    path: PathBuf,
}

impl SnapshotBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes `records` as the complete document.
    ///
    /// # Errors
    /// - `Io` when the temp file cannot be written, synced or renamed.
    /// - `Json` when serialization fails.
    pub fn save_all(&self, records: &[BookRecord]) -> BackendResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let entries: Vec<BookFields> = records.iter().map(BookRecord::to_fields).collect();
        let temp_path = temp_path_for(&self.path);

        if let Err(err) = write_synced(&temp_path, &entries) {
            discard_temp(&temp_path);
            return Err(err);
        }
        if let Err(err) = fs::rename(&temp_path, &self.path) {
            discard_temp(&temp_path);
            return Err(err.into());
        }
        sync_parent_dir(&self.path);

        debug!(
            "event=snapshot_save module=backend status=ok records={} path={}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl CatalogBackend for SnapshotBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Snapshot
    }

    /// Reads the document; a missing file is an empty catalog.
    ///
    /// # Errors
    /// - `Corrupt` when the document is not a valid list of book entries.
    /// - `Io` for other read failures (for example, permission denied).
    fn load_all(&mut self) -> BackendResult<Vec<BookRecord>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let entries: Vec<BookFields> = serde_json::from_slice(&bytes).map_err(|err| {
            BackendError::Corrupt(format!("`{}`: {err}", self.path.display()))
        })?;

        Ok(entries
            .into_iter()
            .zip(1_i64..)
            .map(|(fields, id)| BookRecord::from_fields(BookId::new(id), fields))
            .collect())
    }

    fn insert(&mut self, record: &BookRecord, catalog: &[BookRecord]) -> BackendResult<BookId> {
        self.save_all(catalog)?;
        Ok(record.id)
    }

    fn update(&mut self, _record: &BookRecord, catalog: &[BookRecord]) -> BackendResult<()> {
        self.save_all(catalog)
    }

    fn delete(&mut self, _id: BookId, catalog: &[BookRecord]) -> BackendResult<()> {
        self.save_all(catalog)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|value| value.to_os_string())
        .unwrap_or_else(|| OsString::from("catalog"));
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

fn discard_temp(temp_path: &Path) {
    if let Err(err) = fs::remove_file(temp_path) {
        if err.kind() != ErrorKind::NotFound {
            warn!(
                "event=snapshot_cleanup module=backend status=error path={} error={}",
                temp_path.display(),
                err
            );
        }
    }
}

/// Syncs the directory entry written by the rename; failures are only logged.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    let Some(parent) = path.parent() else {
        return;
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    if let Err(err) = File::open(parent).and_then(|dir| dir.sync_all()) {
        warn!(
            "event=snapshot_dir_sync module=backend status=error path={} error={}",
            parent.display(),
            err
        );
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}

fn write_synced(path: &Path, entries: &[BookFields]) -> BackendResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, entries)?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()?;
    Ok(())
}
