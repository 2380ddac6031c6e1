//! In-process store. Every operation runs under one lock, so conditional
//! deletes are atomic with respect to concurrent writers.

use super::{text_order, BookFilter, CatalogStore, CopyFilter, DeleteOutcome};
use crate::error::StoreError;
use crate::model::{
    Author, AuthorRecord, Book, BookInstance, BookInstanceRecord, BookRecord, Genre, GenreRecord,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    authors: HashMap<Uuid, Author>,
    genres: HashMap<Uuid, Genre>,
    books: HashMap<Uuid, Book>,
    copies: HashMap<Uuid, BookInstance>,
}

impl Tables {
    fn books(&self, filter: BookFilter) -> Vec<Book> {
        let mut books: Vec<Book> = self
            .books
            .values()
            .filter(|b| match filter {
                BookFilter::All => true,
                BookFilter::ByAuthor(id) => b.author == id,
                BookFilter::ByGenre(id) => b.has_genre(id),
            })
            .cloned()
            .collect();
        books.sort_by(|a, b| text_order(&a.title, &b.title).then(a.id.cmp(&b.id)));
        books
    }

    fn copies(&self, filter: CopyFilter) -> Vec<BookInstance> {
        let title = |copy: &BookInstance| {
            self.books
                .get(&copy.book)
                .map(|b| b.title.as_str())
                .unwrap_or_default()
        };
        let mut copies: Vec<BookInstance> = self
            .copies
            .values()
            .filter(|c| match filter {
                CopyFilter::All => true,
                CopyFilter::ByBook(id) => c.book == id,
                CopyFilter::ByStatus(status) => c.status == status,
            })
            .cloned()
            .collect();
        copies.sort_by(|a, b| {
            text_order(title(a), title(b))
                .then_with(|| text_order(&a.imprint, &b.imprint))
                .then(a.id.cmp(&b.id))
        });
        copies
    }

    fn ensure_genre_name_free(&self, name: &str, except: Option<Uuid>) -> Result<(), StoreError> {
        let taken = self
            .genres
            .values()
            .any(|g| Some(g.id) != except && g.same_name(name));
        if taken {
            return Err(StoreError::Duplicate {
                kind: "genre",
                value: name.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_book_references(&self, record: &BookRecord) -> Result<(), StoreError> {
        if !self.authors.contains_key(&record.author) {
            return Err(StoreError::MissingReference {
                kind: "author",
                id: record.author.to_string(),
            });
        }
        if let Some(missing) = record.genre.iter().find(|id| !self.genres.contains_key(id)) {
            return Err(StoreError::MissingReference {
                kind: "genre",
                id: missing.to_string(),
            });
        }
        Ok(())
    }

    fn ensure_copy_references(&self, record: &BookInstanceRecord) -> Result<(), StoreError> {
        if !self.books.contains_key(&record.book) {
            return Err(StoreError::MissingReference {
                kind: "book",
                id: record.book.to_string(),
            });
        }
        Ok(())
    }
}

fn not_found(kind: &'static str, id: Uuid) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[derive(Default)]
pub struct MemoryCatalogStore {
    tables: RwLock<Tables>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }

    async fn close(&self) {}

    async fn create_author(&self, record: AuthorRecord) -> Result<Author, StoreError> {
        record.check_required()?;
        let author = record.with_id(Uuid::new_v4());
        self.write()?.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn find_author(&self, id: Uuid) -> Result<Option<Author>, StoreError> {
        Ok(self.read()?.authors.get(&id).cloned())
    }

    async fn list_authors(&self) -> Result<Vec<Author>, StoreError> {
        let mut authors: Vec<Author> = self.read()?.authors.values().cloned().collect();
        authors.sort_by(|a, b| {
            text_order(&a.family_name, &b.family_name)
                .then_with(|| text_order(&a.first_name, &b.first_name))
                .then(a.id.cmp(&b.id))
        });
        Ok(authors)
    }

    async fn update_author(&self, id: Uuid, record: AuthorRecord) -> Result<Author, StoreError> {
        record.check_required()?;
        let mut tables = self.write()?;
        let slot = tables.authors.get_mut(&id).ok_or(not_found("author", id))?;
        *slot = record.with_id(id);
        Ok(slot.clone())
    }

    async fn delete_author_if_unreferenced(
        &self,
        id: Uuid,
    ) -> Result<DeleteOutcome<Book>, StoreError> {
        let mut tables = self.write()?;
        if !tables.authors.contains_key(&id) {
            return Ok(DeleteOutcome::NotFound);
        }
        let dependents = tables.books(BookFilter::ByAuthor(id));
        if !dependents.is_empty() {
            return Ok(DeleteOutcome::Blocked(dependents));
        }
        tables.authors.remove(&id);
        Ok(DeleteOutcome::Deleted)
    }

    async fn count_authors(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.authors.len() as u64)
    }

    async fn create_genre(&self, record: GenreRecord) -> Result<Genre, StoreError> {
        record.check_required()?;
        let mut tables = self.write()?;
        tables.ensure_genre_name_free(&record.name, None)?;
        let genre = record.with_id(Uuid::new_v4());
        tables.genres.insert(genre.id, genre.clone());
        Ok(genre)
    }

    async fn find_genre(&self, id: Uuid) -> Result<Option<Genre>, StoreError> {
        Ok(self.read()?.genres.get(&id).cloned())
    }

    async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>, StoreError> {
        Ok(self
            .read()?
            .genres
            .values()
            .find(|g| g.same_name(name))
            .cloned())
    }

    async fn find_genres(&self, ids: &[Uuid]) -> Result<Vec<Genre>, StoreError> {
        let tables = self.read()?;
        let mut genres: Vec<Genre> = tables
            .genres
            .values()
            .filter(|g| ids.contains(&g.id))
            .cloned()
            .collect();
        genres.sort_by(|a, b| text_order(&a.name, &b.name).then(a.id.cmp(&b.id)));
        Ok(genres)
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, StoreError> {
        let mut genres: Vec<Genre> = self.read()?.genres.values().cloned().collect();
        genres.sort_by(|a, b| text_order(&a.name, &b.name).then(a.id.cmp(&b.id)));
        Ok(genres)
    }

    async fn update_genre(&self, id: Uuid, record: GenreRecord) -> Result<Genre, StoreError> {
        record.check_required()?;
        let mut tables = self.write()?;
        if !tables.genres.contains_key(&id) {
            return Err(not_found("genre", id));
        }
        tables.ensure_genre_name_free(&record.name, Some(id))?;
        let genre = record.with_id(id);
        tables.genres.insert(id, genre.clone());
        Ok(genre)
    }

    async fn delete_genre_if_unreferenced(
        &self,
        id: Uuid,
    ) -> Result<DeleteOutcome<Book>, StoreError> {
        let mut tables = self.write()?;
        if !tables.genres.contains_key(&id) {
            return Ok(DeleteOutcome::NotFound);
        }
        let dependents = tables.books(BookFilter::ByGenre(id));
        if !dependents.is_empty() {
            return Ok(DeleteOutcome::Blocked(dependents));
        }
        tables.genres.remove(&id);
        Ok(DeleteOutcome::Deleted)
    }

    async fn count_genres(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.genres.len() as u64)
    }

    async fn create_book(&self, record: BookRecord) -> Result<Book, StoreError> {
        record.check_required()?;
        let mut tables = self.write()?;
        tables.ensure_book_references(&record)?;
        let book = record.with_id(Uuid::new_v4());
        tables.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn find_book(&self, id: Uuid) -> Result<Option<Book>, StoreError> {
        Ok(self.read()?.books.get(&id).cloned())
    }

    async fn list_books(&self, filter: BookFilter) -> Result<Vec<Book>, StoreError> {
        Ok(self.read()?.books(filter))
    }

    async fn update_book(&self, id: Uuid, record: BookRecord) -> Result<Book, StoreError> {
        record.check_required()?;
        let mut tables = self.write()?;
        if !tables.books.contains_key(&id) {
            return Err(not_found("book", id));
        }
        tables.ensure_book_references(&record)?;
        let book = record.with_id(id);
        tables.books.insert(id, book.clone());
        Ok(book)
    }

    async fn delete_book_if_unreferenced(
        &self,
        id: Uuid,
    ) -> Result<DeleteOutcome<BookInstance>, StoreError> {
        let mut tables = self.write()?;
        if !tables.books.contains_key(&id) {
            return Ok(DeleteOutcome::NotFound);
        }
        let dependents = tables.copies(CopyFilter::ByBook(id));
        if !dependents.is_empty() {
            return Ok(DeleteOutcome::Blocked(dependents));
        }
        tables.books.remove(&id);
        Ok(DeleteOutcome::Deleted)
    }

    async fn count_books(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.books.len() as u64)
    }

    async fn create_book_instance(
        &self,
        record: BookInstanceRecord,
    ) -> Result<BookInstance, StoreError> {
        record.check_required()?;
        let mut tables = self.write()?;
        tables.ensure_copy_references(&record)?;
        let copy = record.with_id(Uuid::new_v4());
        tables.copies.insert(copy.id, copy.clone());
        Ok(copy)
    }

    async fn find_book_instance(&self, id: Uuid) -> Result<Option<BookInstance>, StoreError> {
        Ok(self.read()?.copies.get(&id).cloned())
    }

    async fn list_book_instances(
        &self,
        filter: CopyFilter,
    ) -> Result<Vec<BookInstance>, StoreError> {
        Ok(self.read()?.copies(filter))
    }

    async fn update_book_instance(
        &self,
        id: Uuid,
        record: BookInstanceRecord,
    ) -> Result<BookInstance, StoreError> {
        record.check_required()?;
        let mut tables = self.write()?;
        if !tables.copies.contains_key(&id) {
            return Err(not_found("book instance", id));
        }
        tables.ensure_copy_references(&record)?;
        let copy = record.with_id(id);
        tables.copies.insert(id, copy.clone());
        Ok(copy)
    }

    async fn delete_book_instance(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.write()?.copies.remove(&id).is_some())
    }

    async fn count_book_instances(&self, filter: CopyFilter) -> Result<u64, StoreError> {
        Ok(self.read()?.copies(filter).len() as u64)
    }
}
