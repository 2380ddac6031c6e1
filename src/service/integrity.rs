//! Referential integrity for deletes: an author or genre with books, or a
//! book with copies, is never removed. The store performs the dependency
//! check and the delete as one atomic step; this layer reports and logs.

use crate::error::AppError;
use crate::model::{Book, BookInstance};
use crate::store::{BookFilter, CatalogStore, CopyFilter, DeleteOutcome};
use uuid::Uuid;

pub struct IntegrityGuard;

impl IntegrityGuard {
    /// Books referencing the author.
    pub async fn author_dependents(
        store: &dyn CatalogStore,
        id: Uuid,
    ) -> Result<Vec<Book>, AppError> {
        Ok(store.list_books(BookFilter::ByAuthor(id)).await?)
    }

    /// Books whose genre list contains the genre.
    pub async fn genre_dependents(
        store: &dyn CatalogStore,
        id: Uuid,
    ) -> Result<Vec<Book>, AppError> {
        Ok(store.list_books(BookFilter::ByGenre(id)).await?)
    }

    /// Copies of the book.
    pub async fn book_dependents(
        store: &dyn CatalogStore,
        id: Uuid,
    ) -> Result<Vec<BookInstance>, AppError> {
        Ok(store.list_book_instances(CopyFilter::ByBook(id)).await?)
    }

    pub async fn delete_author(
        store: &dyn CatalogStore,
        id: Uuid,
    ) -> Result<DeleteOutcome<Book>, AppError> {
        let outcome = store.delete_author_if_unreferenced(id).await?;
        log_outcome("author", id, &outcome);
        Ok(outcome)
    }

    pub async fn delete_genre(
        store: &dyn CatalogStore,
        id: Uuid,
    ) -> Result<DeleteOutcome<Book>, AppError> {
        let outcome = store.delete_genre_if_unreferenced(id).await?;
        log_outcome("genre", id, &outcome);
        Ok(outcome)
    }

    pub async fn delete_book(
        store: &dyn CatalogStore,
        id: Uuid,
    ) -> Result<DeleteOutcome<BookInstance>, AppError> {
        let outcome = store.delete_book_if_unreferenced(id).await?;
        log_outcome("book", id, &outcome);
        Ok(outcome)
    }
}

fn log_outcome<D>(kind: &'static str, id: Uuid, outcome: &DeleteOutcome<D>) {
    match outcome {
        DeleteOutcome::Deleted => tracing::info!(kind, %id, "deleted"),
        DeleteOutcome::Blocked(dependents) => tracing::warn!(
            kind,
            %id,
            dependents = dependents.len(),
            "delete refused: record still referenced"
        ),
        DeleteOutcome::NotFound => tracing::debug!(kind, %id, "delete of missing record"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuthorRecord, BookRecord, GenreRecord};
    use crate::store::MemoryCatalogStore;

    #[tokio::test]
    async fn genre_delete_blocked_by_exactly_the_referencing_books() {
        let store = MemoryCatalogStore::new();
        let author = store
            .create_author(AuthorRecord {
                first_name: "Ann".into(),
                family_name: "Leckie".into(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap();
        let sf = store
            .create_genre(GenreRecord { name: "Science Fiction".into() })
            .await
            .unwrap();
        let other = store
            .create_genre(GenreRecord { name: "Poetry".into() })
            .await
            .unwrap();
        let mut expected = Vec::new();
        for (title, genre) in [
            ("Ancillary Sword", vec![sf.id]),
            ("Ancillary Justice", vec![other.id, sf.id]),
            ("Verses", vec![other.id]),
        ] {
            let book = store
                .create_book(BookRecord {
                    title: title.into(),
                    author: author.id,
                    summary: "s".into(),
                    isbn: "i".into(),
                    genre,
                })
                .await
                .unwrap();
            if book.has_genre(sf.id) {
                expected.push(book);
            }
        }
        expected.sort_by(|a, b| a.title.cmp(&b.title));

        assert_eq!(
            IntegrityGuard::genre_dependents(&store, sf.id).await.unwrap(),
            expected
        );
        assert_eq!(
            IntegrityGuard::delete_genre(&store, sf.id).await.unwrap(),
            DeleteOutcome::Blocked(expected)
        );
        assert!(store.find_genre(sf.id).await.unwrap().is_some());
    }
}
