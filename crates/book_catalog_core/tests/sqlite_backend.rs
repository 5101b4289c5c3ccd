mod common;

use book_catalog_core::db::schema::SCHEMA_VERSION;
use book_catalog_core::db::{open_db, open_db_in_memory, DbError};
use book_catalog_core::{
    BackendError, BackendKind, BookFields, BookId, BookRecord, CatalogBackend, SqliteBackend,
};
use common::dune;
use rusqlite::Connection;

fn draft(fields: BookFields) -> BookRecord {
    BookRecord::from_fields(BookId::new(0), fields)
}

#[test]
fn open_in_memory_creates_books_schema() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let conn = backend.connection();

    assert_eq!(backend.kind(), BackendKind::Relational);
    assert_eq!(schema_version(conn), SCHEMA_VERSION);
    assert_table_exists(conn, "books");
}

#[test]
fn insert_assigns_surrogate_keys_and_load_orders_by_key() {
    let mut backend = SqliteBackend::open_in_memory().unwrap();

    let first = backend
        .insert(&draft(BookFields::new("Emma", "Austen")), &[])
        .unwrap();
    let second = backend.insert(&draft(dune()), &[]).unwrap();
    assert!(second > first);

    let loaded = backend.load_all().unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].id, first);
    assert_eq!(loaded[0].isbn, None);
    assert_eq!(loaded[1].id, second);
    assert_eq!(loaded[1].isbn.as_deref(), Some("123"));
    assert_eq!(loaded[1].publication_year, Some(1965));
    assert_eq!(loaded[1].genre, "SF");
    assert_eq!(loaded[1].read, None);
}

#[test]
fn unique_index_rejects_duplicate_isbn() {
    let mut backend = SqliteBackend::open_in_memory().unwrap();
    backend.insert(&draft(dune()), &[]).unwrap();

    let duplicate = draft(BookFields::new("Not Dune", "Someone").with_isbn("123"));
    let err = backend.insert(&duplicate, &[]).unwrap_err();

    assert!(matches!(err, BackendError::Conflict { ref isbn } if isbn == "123"));
    assert_eq!(backend.load_all().unwrap().len(), 1);
}

#[test]
fn unique_index_allows_many_books_without_isbn() {
    let mut backend = SqliteBackend::open_in_memory().unwrap();
    backend
        .insert(&draft(BookFields::new("A", "X")), &[])
        .unwrap();
    backend
        .insert(&draft(BookFields::new("B", "Y")), &[])
        .unwrap();

    assert_eq!(backend.load_all().unwrap().len(), 2);
}

#[test]
fn isbn_constraint_is_case_sensitive() {
    let mut backend = SqliteBackend::open_in_memory().unwrap();
    backend
        .insert(&draft(BookFields::new("A", "X").with_isbn("abc")), &[])
        .unwrap();
    backend
        .insert(&draft(BookFields::new("B", "Y").with_isbn("ABC")), &[])
        .unwrap();

    assert_eq!(backend.load_all().unwrap().len(), 2);
}

#[test]
fn update_replaces_row_and_reports_conflicts_and_missing_rows() {
    let mut backend = SqliteBackend::open_in_memory().unwrap();
    let dune_id = backend.insert(&draft(dune()), &[]).unwrap();
    let emma_id = backend
        .insert(&draft(BookFields::new("Emma", "Austen").with_isbn("456")), &[])
        .unwrap();

    let renamed = BookRecord::from_fields(dune_id, dune().with_genre("Classic").with_read(true));
    backend.update(&renamed, &[]).unwrap();
    let loaded = backend.load_all().unwrap();
    assert_eq!(loaded[0], renamed);

    let stolen =
        BookRecord::from_fields(emma_id, BookFields::new("Emma", "Austen").with_isbn("123"));
    let err = backend.update(&stolen, &[]).unwrap_err();
    assert!(matches!(err, BackendError::Conflict { .. }));

    let ghost = BookRecord::from_fields(BookId::new(999), BookFields::new("Ghost", "Nobody"));
    let err = backend.update(&ghost, &[]).unwrap_err();
    assert!(matches!(err, BackendError::NotFound(id) if id == BookId::new(999)));
}

#[test]
fn deleted_ids_are_not_reused() {
    let mut backend = SqliteBackend::open_in_memory().unwrap();
    let first = backend.insert(&draft(BookFields::new("A", "X")), &[]).unwrap();
    let second = backend.insert(&draft(BookFields::new("B", "Y")), &[]).unwrap();
    backend.delete(second, &[]).unwrap();

    let third = backend.insert(&draft(BookFields::new("C", "Z")), &[]).unwrap();
    assert!(third > second);
    assert!(second > first);

    let err = backend.delete(second, &[]).unwrap_err();
    assert!(matches!(err, BackendError::NotFound(id) if id == second));
}

#[test]
fn reopening_file_database_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.sqlite3");

    let mut backend = SqliteBackend::open(&path).unwrap();
    let id = backend.insert(&draft(dune()), &[]).unwrap();
    drop(backend);

    let mut reopened = SqliteBackend::open(&path).unwrap();
    let loaded = reopened.load_all().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, id);
    assert_eq!(loaded[0].title, "Dune");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert!(err.to_string().contains("schema v999"));
    match err {
        DbError::SchemaTooNew {
            found,
            readable_up_to,
        } => {
            assert_eq!(found, 999);
            assert_eq!(readable_up_to, SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn try_new_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteBackend::try_new(conn);
    assert!(matches!(result, Err(BackendError::MissingSchema(_))));
}

#[test]
fn try_new_rejects_books_table_missing_columns() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT NOT NULL);
         PRAGMA user_version = {SCHEMA_VERSION};"
    ))
    .unwrap();

    match SqliteBackend::try_new(conn) {
        Err(BackendError::MissingSchema(message)) => assert!(message.contains("author")),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected missing column error"),
    }
}

#[test]
fn try_new_accepts_bootstrapped_connection() {
    let conn = open_db_in_memory().unwrap();
    assert!(SqliteBackend::try_new(conn).is_ok());
}

#[test]
fn invalid_read_value_is_rejected_on_load() {
    let mut backend = SqliteBackend::open_in_memory().unwrap();
    let id = backend.insert(&draft(BookFields::new("A", "X")), &[]).unwrap();
    backend
        .connection()
        .execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    backend
        .connection()
        .execute("UPDATE books SET read = 7 WHERE id = ?1;", [id.get()])
        .unwrap();

    let err = backend.load_all().unwrap_err();
    assert!(matches!(err, BackendError::Corrupt(_)));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
