use my_book_store::db::{open_database, open_in_memory, SqliteBookRepository};
use my_book_store::store::{BookHandle, ChangeSet, RecordStore};
use my_book_store::{Book, BookRepository, Catalog, PersistenceError, Selection, SortKey};
use tempfile::TempDir;

fn handles(count: usize) -> Vec<BookHandle> {
    let mut store = RecordStore::new();
    (0..count).map(|_| store.add()).collect()
}

fn seed(repo: &mut SqliteBookRepository, books: &[Book]) {
    let changes = ChangeSet {
        inserted: handles(books.len()).into_iter().zip(books.iter().cloned()).collect(),
        ..ChangeSet::default()
    };
    repo.commit(&changes).unwrap();
}

#[test]
fn schema_creation_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("books.sqlite");

    open_database(&path).unwrap();
    let conn = open_database(&path).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn load_all_returns_rows_in_insertion_order_with_nulls() {
    let mut repo = SqliteBookRepository::in_memory().unwrap();
    seed(
        &mut repo,
        &[
            Book::new("Zeta", "A", "2000").with_note("signed copy"),
            Book::default(),
            Book::new("Alpha", "", "1999"),
        ],
    );

    let stored = repo.load_all().unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(stored[0].book.note.as_deref(), Some("signed copy"));
    assert_eq!(stored[1].book, Book::default());
    assert_eq!(stored[2].book.author, None);
}

#[test]
fn catalog_changes_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("books.sqlite");

    {
        let mut catalog = Catalog::load(SqliteBookRepository::open(&path).unwrap()).unwrap();
        catalog.add();
        catalog.update_selected(Book::new("Zeta", "A", "2000"));
        catalog.add();
        catalog.update_selected(Book::new("Alpha", "B", "1999"));
        catalog.add();
        catalog.update_selected(Book::new("Doomed", "", ""));
        catalog.save().unwrap();

        catalog.remove_selected().unwrap();
        catalog.go_first();
        catalog.update_selected(Book::new("Zeta", "A", "2001"));
        assert_eq!(catalog.save().unwrap(), 2);
    }

    let mut catalog = Catalog::load(SqliteBookRepository::open(&path).unwrap()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert!(!catalog.has_unsaved_changes());

    catalog.sort_by_column(SortKey::Title);
    let books: Vec<_> = catalog.store().all().into_iter().cloned().collect();
    assert_eq!(
        books,
        vec![Book::new("Alpha", "B", "1999"), Book::new("Zeta", "A", "2001")]
    );
}

#[test]
fn rejected_commit_rolls_back_everything() {
    let mut repo = SqliteBookRepository::in_memory().unwrap();
    seed(&mut repo, &[Book::new("Keep", "", "")]);

    let changes = ChangeSet {
        inserted: vec![(handles(1)[0], Book::new("New", "", ""))],
        updated: vec![(999, Book::new("Ghost", "", ""))],
        deleted: vec![1],
    };
    let err = repo.commit(&changes).unwrap_err();

    assert!(matches!(err, PersistenceError::MissingRecord(999)));
    let stored = repo.load_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].book.title.as_deref(), Some("Keep"));
}

#[test]
fn failed_save_leaves_catalog_usable() {
    let mut repo = SqliteBookRepository::in_memory().unwrap();
    seed(&mut repo, &[Book::new("Original", "", "")]);
    let mut catalog = Catalog::load(repo).unwrap();
    catalog.go_first();
    catalog.update_selected(Book::new("Edited", "", ""));

    // Remove the row behind the catalog's back so the update is rejected.
    catalog
        .repository()
        .connection()
        .execute("DELETE FROM books", [])
        .unwrap();

    assert!(matches!(
        catalog.save(),
        Err(PersistenceError::MissingRecord(_))
    ));
    assert!(catalog.has_unsaved_changes());
    assert_eq!(catalog.selection(), Selection::At(0));
    assert_eq!(catalog.status_label(), "Record 1 of 1");

    catalog.remove_selected();
    assert_eq!(catalog.save().unwrap(), 1);
    assert!(!catalog.has_unsaved_changes());
}

#[test]
fn open_in_memory_has_schema() {
    let conn = open_in_memory().unwrap();
    conn.execute(
        "INSERT INTO books (title, author, year, note) VALUES (NULL, NULL, NULL, NULL)",
        [],
    )
    .unwrap();
}
