mod common;

use book_catalog_core::{
    BookFields, CatalogStore, ConsistencyMode, RemoveKey, SearchField, SnapshotBackend,
    SqliteBackend,
};
use common::book;

fn seeded_store() -> CatalogStore<SqliteBackend> {
    let store = CatalogStore::open(
        SqliteBackend::open_in_memory().unwrap(),
        ConsistencyMode::UniqueIsbn,
    )
    .unwrap();
    for fields in [
        BookFields::new("Dune", "Frank Herbert").with_isbn("978-0441013593"),
        BookFields::new("Dune Messiah", "Frank Herbert").with_isbn("978-0593098233"),
        BookFields::new("Emma", "Jane Austen"),
        BookFields::new("Solaris", "Stanislaw Lem").with_isbn("978-0156027601"),
    ] {
        store.add(fields).unwrap();
    }
    store
}

#[test]
fn empty_term_returns_every_record() {
    let store = seeded_store();
    assert_eq!(
        store.search("", SearchField::Any).unwrap(),
        store.list().unwrap()
    );
}

#[test]
fn title_search_is_the_matching_subsequence_of_list() {
    let store = seeded_store();

    let hits = store.search("DUNE", SearchField::Title).unwrap();
    let expected: Vec<_> = store
        .list()
        .unwrap()
        .into_iter()
        .filter(|book| book.title.to_lowercase().contains("dune"))
        .collect();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits, expected);
}

#[test]
fn author_and_isbn_searches_use_their_own_fields() {
    let store = seeded_store();

    let by_author = store.search("herbert", SearchField::Author).unwrap();
    assert_eq!(by_author.len(), 2);

    let by_isbn = store.search("0156", SearchField::Isbn).unwrap();
    assert_eq!(by_isbn.len(), 1);
    assert_eq!(by_isbn[0].title, "Solaris");

    assert!(store.search("0156", SearchField::Title).unwrap().is_empty());
}

#[test]
fn any_field_search_matches_title_author_or_isbn() {
    let store = seeded_store();

    let titles = |term: &str| -> Vec<String> {
        store
            .search(term, SearchField::Any)
            .unwrap()
            .into_iter()
            .map(|book| book.title)
            .collect()
    };

    assert_eq!(titles("austen"), vec!["Emma"]);
    assert_eq!(titles("messiah"), vec!["Dune Messiah"]);
    assert_eq!(titles("978-0441"), vec!["Dune"]);
    assert!(titles("tolkien").is_empty());
}

#[test]
fn statistics_track_the_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let store = CatalogStore::open(
        SnapshotBackend::new(dir.path().join("library.json")),
        ConsistencyMode::ReadStatus,
    )
    .unwrap();

    let empty = store.statistics().unwrap();
    assert_eq!(empty.total, 0);
    assert_eq!(empty.read_percentage, 0.0);

    store.add(book("Emma", "Austen", 1815, "Novel", true)).unwrap();
    store.add(book("Dune", "Herbert", 1965, "SF", false)).unwrap();
    store.add(book("Beloved", "Morrison", 1987, "Novel", true)).unwrap();

    let stats = store.statistics().unwrap();
    assert_eq!(stats.total, store.list().unwrap().len());
    assert_eq!(stats.read_count, 2);
    assert_eq!(stats.rounded_percentage(), 66.7);
    assert_eq!(stats.to_string(), "Total books: 3\nPercentage read: 66.7%");

    store.remove(&RemoveKey::Title("emma".into())).unwrap();
    let stats = store.statistics().unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.read_count, 1);
    assert_eq!(stats.read_percentage, 50.0);
}
