//! `PgCatalogStore` against a live database. Each test skips unless
//! `DATABASE_URL` is set, and works in a schema of its own.

use chrono::NaiveDate;
use library_catalog::model::{
    AuthorRecord, BookInstanceRecord, BookRecord, BookStatus, GenreRecord,
};
use library_catalog::store::{BookFilter, CopyFilter, DeleteOutcome};
use library_catalog::{AppConfig, CatalogStore, PgCatalogStore, StoreError};
use uuid::Uuid;

struct Scratch {
    store: PgCatalogStore,
    url: String,
    schema: String,
}

impl Scratch {
    async fn open() -> Option<Scratch> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping");
            return None;
        };
        let schema = format!("catalog_test_{}", Uuid::new_v4().simple());
        let config = AppConfig {
            database_url: url.clone(),
            schema: schema.clone(),
            max_connections: 2,
            ..AppConfig::default()
        };
        let store = PgCatalogStore::connect(&config).await.unwrap();
        Some(Scratch { store, url, schema })
    }

    async fn finish(self) {
        self.store.close().await;
        let pool = sqlx::PgPool::connect(&self.url).await.unwrap();
        sqlx::query(&format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", self.schema))
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;
    }
}

fn author(first: &str, family: &str) -> AuthorRecord {
    AuthorRecord {
        first_name: first.into(),
        family_name: family.into(),
        date_of_birth: None,
        date_of_death: None,
    }
}

fn book(title: &str, author: Uuid, genre: Vec<Uuid>) -> BookRecord {
    BookRecord {
        title: title.into(),
        author,
        summary: "summary".into(),
        isbn: "9780000000000".into(),
        genre,
    }
}

fn copy(book: Uuid, imprint: &str, status: BookStatus) -> BookInstanceRecord {
    BookInstanceRecord {
        book,
        imprint: imprint.into(),
        status,
        due_back: None,
    }
}

#[tokio::test]
async fn author_lifecycle() {
    let Some(scratch) = Scratch::open().await else {
        return;
    };
    let store = &scratch.store;

    let mut record = author("Ursula", "Le Guin");
    record.date_of_birth = NaiveDate::from_ymd_opt(1929, 10, 21);
    let created = store.create_author(record.clone()).await.unwrap();
    assert_eq!(store.find_author(created.id).await.unwrap(), Some(created.clone()));
    assert_eq!(store.count_authors().await.unwrap(), 1);

    record.date_of_death = NaiveDate::from_ymd_opt(2018, 1, 22);
    let updated = store.update_author(created.id, record).await.unwrap();
    assert_eq!(store.find_author(created.id).await.unwrap(), Some(updated));

    let missing = Uuid::new_v4();
    assert!(matches!(
        store.update_author(missing, author("A", "B")).await,
        Err(StoreError::NotFound { kind: "author", .. })
    ));

    let written = store.create_book(book("Lathe", created.id, vec![])).await.unwrap();
    match store.delete_author_if_unreferenced(created.id).await.unwrap() {
        DeleteOutcome::Blocked(books) => assert_eq!(books, vec![written.clone()]),
        other => panic!("expected blocked, got {:?}", other),
    }
    assert!(store.find_author(created.id).await.unwrap().is_some());

    assert_eq!(
        store.delete_book_if_unreferenced(written.id).await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        store.delete_author_if_unreferenced(created.id).await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        store.delete_author_if_unreferenced(created.id).await.unwrap(),
        DeleteOutcome::NotFound
    );
    assert_eq!(store.find_author(created.id).await.unwrap(), None);

    scratch.finish().await;
}

#[tokio::test]
async fn genre_names_unique_ignoring_case() {
    let Some(scratch) = Scratch::open().await else {
        return;
    };
    let store = &scratch.store;

    let fiction = store
        .create_genre(GenreRecord { name: "Fiction".into() })
        .await
        .unwrap();
    assert!(matches!(
        store.create_genre(GenreRecord { name: "fiction".into() }).await,
        Err(StoreError::Duplicate { kind: "genre", .. })
    ));
    assert_eq!(
        store.find_genre_by_name("FICTION").await.unwrap(),
        Some(fiction.clone())
    );

    let poetry = store
        .create_genre(GenreRecord { name: "Poetry".into() })
        .await
        .unwrap();
    assert!(matches!(
        store
            .update_genre(poetry.id, GenreRecord { name: "FICTION".into() })
            .await,
        Err(StoreError::Duplicate { kind: "genre", .. })
    ));
    let renamed = store
        .update_genre(poetry.id, GenreRecord { name: "Verse".into() })
        .await
        .unwrap();
    assert_eq!(store.find_genre(poetry.id).await.unwrap(), Some(renamed));
    assert_eq!(store.count_genres().await.unwrap(), 2);

    scratch.finish().await;
}

#[tokio::test]
async fn genre_delete_blocked_by_books() {
    let Some(scratch) = Scratch::open().await else {
        return;
    };
    let store = &scratch.store;

    let author = store.create_author(author("Iain", "Banks")).await.unwrap();
    let sf = store
        .create_genre(GenreRecord { name: "Science Fiction".into() })
        .await
        .unwrap();
    let written = store
        .create_book(book("Excession", author.id, vec![sf.id]))
        .await
        .unwrap();

    match store.delete_genre_if_unreferenced(sf.id).await.unwrap() {
        DeleteOutcome::Blocked(books) => assert_eq!(books, vec![written.clone()]),
        other => panic!("expected blocked, got {:?}", other),
    }
    store
        .update_book(written.id, book("Excession", author.id, vec![]))
        .await
        .unwrap();
    assert_eq!(
        store.delete_genre_if_unreferenced(sf.id).await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        store.delete_genre_if_unreferenced(sf.id).await.unwrap(),
        DeleteOutcome::NotFound
    );

    scratch.finish().await;
}

#[tokio::test]
async fn book_genres_keep_submission_order() {
    let Some(scratch) = Scratch::open().await else {
        return;
    };
    let store = &scratch.store;

    let author = store.create_author(author("Ann", "Leckie")).await.unwrap();
    let opera = store
        .create_genre(GenreRecord { name: "Space Opera".into() })
        .await
        .unwrap();
    let military = store
        .create_genre(GenreRecord { name: "Military".into() })
        .await
        .unwrap();

    let created = store
        .create_book(book("Ancillary Justice", author.id, vec![opera.id, military.id]))
        .await
        .unwrap();
    let found = store.find_book(created.id).await.unwrap().unwrap();
    assert_eq!(found.genre, vec![opera.id, military.id]);

    store
        .update_book(created.id, book("Ancillary Justice", author.id, vec![military.id]))
        .await
        .unwrap();
    let found = store.find_book(created.id).await.unwrap().unwrap();
    assert_eq!(found.genre, vec![military.id]);

    let by_genre = store
        .list_books(BookFilter::ByGenre(military.id))
        .await
        .unwrap();
    assert_eq!(by_genre.len(), 1);
    assert!(store
        .list_books(BookFilter::ByGenre(opera.id))
        .await
        .unwrap()
        .is_empty());

    scratch.finish().await;
}

#[tokio::test]
async fn unknown_references_are_reported() {
    let Some(scratch) = Scratch::open().await else {
        return;
    };
    let store = &scratch.store;

    assert!(matches!(
        store.create_book(book("Orphan", Uuid::new_v4(), vec![])).await,
        Err(StoreError::MissingReference { kind: "author", .. })
    ));
    let author = store.create_author(author("Jane", "Austen")).await.unwrap();
    assert!(matches!(
        store
            .create_book(book("Emma", author.id, vec![Uuid::new_v4()]))
            .await,
        Err(StoreError::MissingReference { kind: "genre", .. })
    ));
    assert!(store.list_books(BookFilter::All).await.unwrap().is_empty());
    assert!(matches!(
        store
            .create_book_instance(copy(Uuid::new_v4(), "Penguin", BookStatus::Available))
            .await,
        Err(StoreError::MissingReference { kind: "book", .. })
    ));

    scratch.finish().await;
}

#[tokio::test]
async fn copy_lifecycle_and_book_delete() {
    let Some(scratch) = Scratch::open().await else {
        return;
    };
    let store = &scratch.store;

    let author = store.create_author(author("Jane", "Austen")).await.unwrap();
    let emma = store.create_book(book("Emma", author.id, vec![])).await.unwrap();
    let created = store
        .create_book_instance(copy(emma.id, "Penguin 2003", BookStatus::Maintenance))
        .await
        .unwrap();
    assert_eq!(
        store.find_book_instance(created.id).await.unwrap(),
        Some(created.clone())
    );

    let mut record = copy(emma.id, "Penguin 2003", BookStatus::Loaned);
    record.due_back = NaiveDate::from_ymd_opt(2024, 3, 1);
    let updated = store
        .update_book_instance(created.id, record)
        .await
        .unwrap();
    assert_eq!(
        store.find_book_instance(created.id).await.unwrap(),
        Some(updated.clone())
    );
    assert_eq!(
        store
            .count_book_instances(CopyFilter::ByStatus(BookStatus::Loaned))
            .await
            .unwrap(),
        1
    );

    match store.delete_book_if_unreferenced(emma.id).await.unwrap() {
        DeleteOutcome::Blocked(copies) => assert_eq!(copies, vec![updated]),
        other => panic!("expected blocked, got {:?}", other),
    }
    assert!(store.delete_book_instance(created.id).await.unwrap());
    assert!(!store.delete_book_instance(created.id).await.unwrap());
    assert_eq!(
        store.delete_book_if_unreferenced(emma.id).await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(store.find_book(emma.id).await.unwrap(), None);

    scratch.finish().await;
}

#[tokio::test]
async fn listings_sort_ignoring_case() {
    let Some(scratch) = Scratch::open().await else {
        return;
    };
    let store = &scratch.store;

    let author = store.create_author(author("Ann", "Leckie")).await.unwrap();
    for title in ["cherry", "Banana", "apple"] {
        store.create_book(book(title, author.id, vec![])).await.unwrap();
    }
    let titles: Vec<String> = store
        .list_books(BookFilter::All)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, vec!["apple", "Banana", "cherry"]);

    for name in ["poetry", "Horror"] {
        store
            .create_genre(GenreRecord { name: name.into() })
            .await
            .unwrap();
    }
    let names: Vec<String> = store
        .list_genres()
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(names, vec!["Horror", "poetry"]);

    scratch.finish().await;
}
