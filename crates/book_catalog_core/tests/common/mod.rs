#![allow(dead_code)]

use book_catalog_core::{
    BackendError, BackendKind, BackendResult, BookFields, BookId, BookRecord, CatalogBackend,
};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Switches shared between a test and its [`FlakyBackend`].
#[derive(Clone, Default)]
pub struct BackendProbe {
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl BackendProbe {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

/// Delegating backend that counts writes and can be told to fail them.
pub struct FlakyBackend<B> {
    inner: B,
    probe: BackendProbe,
}

impl<B: CatalogBackend> FlakyBackend<B> {
    pub fn new(inner: B) -> (Self, BackendProbe) {
        let probe = BackendProbe::default();
        (
            Self {
                inner,
                probe: probe.clone(),
            },
            probe,
        )
    }

    fn before_write(&self) -> BackendResult<()> {
        if self.probe.fail_writes.load(Ordering::SeqCst) {
            return Err(BackendError::Io(io::Error::new(
                io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.probe.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl<B: CatalogBackend> CatalogBackend for FlakyBackend<B> {
    fn kind(&self) -> BackendKind {
        self.inner.kind()
    }

    fn load_all(&mut self) -> BackendResult<Vec<BookRecord>> {
        self.inner.load_all()
    }

    fn insert(&mut self, record: &BookRecord, catalog: &[BookRecord]) -> BackendResult<BookId> {
        self.before_write()?;
        self.inner.insert(record, catalog)
    }

    fn update(&mut self, record: &BookRecord, catalog: &[BookRecord]) -> BackendResult<()> {
        self.before_write()?;
        self.inner.update(record, catalog)
    }

    fn delete(&mut self, id: BookId, catalog: &[BookRecord]) -> BackendResult<()> {
        self.before_write()?;
        self.inner.delete(id, catalog)
    }
}

pub fn dune() -> BookFields {
    BookFields::new("Dune", "Herbert")
        .with_isbn("123")
        .with_year(1965)
        .with_genre("SF")
}

pub fn book(title: &str, author: &str, year: i32, genre: &str, read: bool) -> BookFields {
    BookFields::new(title, author)
        .with_year(year)
        .with_genre(genre)
        .with_read(read)
}
