//! Entity store: persistence seam for authors, genres, books and book copies.
//!
//! Lists are always returned in a deterministic order. Deletes of entities that
//! can be referenced are conditional: the dependency check and the delete run
//! as one atomic step inside the store.

mod memory;
mod postgres;

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

use crate::error::StoreError;
use crate::model::{
    Author, AuthorRecord, Book, BookInstance, BookInstanceRecord, BookRecord, BookStatus, Genre,
    GenreRecord,
};
use async_trait::async_trait;
use std::cmp::Ordering;
use uuid::Uuid;

/// Listing order for names and titles: case-insensitive, ties broken by the
/// exact bytes. [`PgCatalogStore`] sorts the same way with
/// `lower(col) COLLATE "C", col COLLATE "C"`, independent of the database locale.
pub fn text_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookFilter {
    All,
    ByAuthor(Uuid),
    ByGenre(Uuid),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyFilter {
    All,
    ByBook(Uuid),
    ByStatus(BookStatus),
}

/// Result of a conditional delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome<D> {
    Deleted,
    /// Nothing was removed; these records still reference the target.
    Blocked(Vec<D>),
    NotFound,
}

#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release underlying connections. Called once at shutdown.
    async fn close(&self);

    async fn create_author(&self, record: AuthorRecord) -> Result<Author, StoreError>;
    async fn find_author(&self, id: Uuid) -> Result<Option<Author>, StoreError>;
    /// Sorted by family name, then first name, under [`text_order`].
    async fn list_authors(&self) -> Result<Vec<Author>, StoreError>;
    async fn update_author(&self, id: Uuid, record: AuthorRecord) -> Result<Author, StoreError>;
    async fn delete_author_if_unreferenced(
        &self,
        id: Uuid,
    ) -> Result<DeleteOutcome<Book>, StoreError>;
    async fn count_authors(&self) -> Result<u64, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when a genre with the same name
    /// (case-insensitive) exists.
    async fn create_genre(&self, record: GenreRecord) -> Result<Genre, StoreError>;
    async fn find_genre(&self, id: Uuid) -> Result<Option<Genre>, StoreError>;
    /// Case-insensitive lookup.
    async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>, StoreError>;
    /// Genres with the given ids, sorted by name under [`text_order`]. Unknown ids are skipped.
    async fn find_genres(&self, ids: &[Uuid]) -> Result<Vec<Genre>, StoreError>;
    /// Sorted by name under [`text_order`].
    async fn list_genres(&self) -> Result<Vec<Genre>, StoreError>;
    async fn update_genre(&self, id: Uuid, record: GenreRecord) -> Result<Genre, StoreError>;
    async fn delete_genre_if_unreferenced(
        &self,
        id: Uuid,
    ) -> Result<DeleteOutcome<Book>, StoreError>;
    async fn count_genres(&self) -> Result<u64, StoreError>;

    async fn create_book(&self, record: BookRecord) -> Result<Book, StoreError>;
    async fn find_book(&self, id: Uuid) -> Result<Option<Book>, StoreError>;
    /// Sorted by title under [`text_order`].
    async fn list_books(&self, filter: BookFilter) -> Result<Vec<Book>, StoreError>;
    async fn update_book(&self, id: Uuid, record: BookRecord) -> Result<Book, StoreError>;
    async fn delete_book_if_unreferenced(
        &self,
        id: Uuid,
    ) -> Result<DeleteOutcome<BookInstance>, StoreError>;
    async fn count_books(&self) -> Result<u64, StoreError>;

    async fn create_book_instance(
        &self,
        record: BookInstanceRecord,
    ) -> Result<BookInstance, StoreError>;
    async fn find_book_instance(&self, id: Uuid) -> Result<Option<BookInstance>, StoreError>;
    /// Sorted by book title, then imprint, under [`text_order`].
    async fn list_book_instances(
        &self,
        filter: CopyFilter,
    ) -> Result<Vec<BookInstance>, StoreError>;
    async fn update_book_instance(
        &self,
        id: Uuid,
        record: BookInstanceRecord,
    ) -> Result<BookInstance, StoreError>;
    /// Unconditional; returns whether a copy was removed.
    async fn delete_book_instance(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn count_book_instances(&self, filter: CopyFilter) -> Result<u64, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_order_folds_case_then_breaks_ties() {
        let mut titles = vec!["cherry", "Banana", "apple", "banana"];
        titles.sort_by(|a, b| text_order(a, b));
        assert_eq!(titles, vec!["apple", "Banana", "banana", "cherry"]);
    }
}
