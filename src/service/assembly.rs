//! Gathers the records each page needs and resolves references for display.
//! Independent reads are issued concurrently and joined before rendering.

use crate::error::AppError;
use crate::model::{Author, Book, BookInstance, BookStatus, Genre};
use crate::store::{BookFilter, CatalogStore, CopyFilter};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    pub books: u64,
    pub copies: u64,
    pub copies_available: u64,
    pub authors: u64,
    pub genres: u64,
}

#[derive(Clone, Debug)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<Book>,
}

#[derive(Clone, Debug)]
pub struct GenreDetail {
    pub genre: Genre,
    pub books: Vec<Book>,
}

/// A book with its author and genres expanded, plus all of its copies.
#[derive(Clone, Debug)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
    pub copies: Vec<BookInstance>,
}

#[derive(Clone, Debug)]
pub struct BookListEntry {
    pub book: Book,
    pub author: Option<Author>,
}

/// A copy with its parent book resolved.
#[derive(Clone, Debug)]
pub struct CopyView {
    pub copy: BookInstance,
    pub book: Option<Book>,
}

/// One multi-select option on the book form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenreChoice {
    pub genre: Genre,
    pub checked: bool,
}

/// Options for the book form selects.
#[derive(Clone, Debug, Default)]
pub struct BookChoices {
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

impl BookChoices {
    /// Every genre, checked when `selected` says so.
    pub fn genre_choices(&self, selected: impl Fn(&Genre) -> bool) -> Vec<GenreChoice> {
        self.genres
            .iter()
            .map(|genre| GenreChoice {
                genre: genre.clone(),
                checked: selected(genre),
            })
            .collect()
    }
}

pub struct ViewAssembly;

impl ViewAssembly {
    /// Five unrelated counts, read concurrently.
    pub async fn dashboard(store: &dyn CatalogStore) -> Result<Dashboard, AppError> {
        let (books, copies, copies_available, authors, genres) = tokio::try_join!(
            store.count_books(),
            store.count_book_instances(CopyFilter::All),
            store.count_book_instances(CopyFilter::ByStatus(BookStatus::Available)),
            store.count_authors(),
            store.count_genres(),
        )?;
        Ok(Dashboard {
            books,
            copies,
            copies_available,
            authors,
            genres,
        })
    }

    pub async fn author_detail(
        store: &dyn CatalogStore,
        id: Uuid,
    ) -> Result<Option<AuthorDetail>, AppError> {
        let (author, books) = tokio::try_join!(
            store.find_author(id),
            store.list_books(BookFilter::ByAuthor(id)),
        )?;
        Ok(author.map(|author| AuthorDetail { author, books }))
    }

    pub async fn genre_detail(
        store: &dyn CatalogStore,
        id: Uuid,
    ) -> Result<Option<GenreDetail>, AppError> {
        let (genre, books) = tokio::try_join!(
            store.find_genre(id),
            store.list_books(BookFilter::ByGenre(id)),
        )?;
        Ok(genre.map(|genre| GenreDetail { genre, books }))
    }

    pub async fn book_detail(
        store: &dyn CatalogStore,
        id: Uuid,
    ) -> Result<Option<BookDetail>, AppError> {
        let (book, copies) = tokio::try_join!(
            store.find_book(id),
            store.list_book_instances(CopyFilter::ByBook(id)),
        )?;
        let Some(book) = book else {
            return Ok(None);
        };
        let (author, genres) = tokio::try_join!(
            store.find_author(book.author),
            store.find_genres(&book.genre),
        )?;
        Ok(Some(BookDetail {
            book,
            author,
            genres,
            copies,
        }))
    }

    pub async fn book_list(store: &dyn CatalogStore) -> Result<Vec<BookListEntry>, AppError> {
        let (books, authors) = tokio::try_join!(store.list_books(BookFilter::All), store.list_authors())?;
        let authors: HashMap<Uuid, Author> = authors.into_iter().map(|a| (a.id, a)).collect();
        Ok(books
            .into_iter()
            .map(|book| BookListEntry {
                author: authors.get(&book.author).cloned(),
                book,
            })
            .collect())
    }

    pub async fn copy_list(store: &dyn CatalogStore) -> Result<Vec<CopyView>, AppError> {
        let (copies, books) = tokio::try_join!(
            store.list_book_instances(CopyFilter::All),
            store.list_books(BookFilter::All),
        )?;
        let books: HashMap<Uuid, Book> = books.into_iter().map(|b| (b.id, b)).collect();
        Ok(copies
            .into_iter()
            .map(|copy| CopyView {
                book: books.get(&copy.book).cloned(),
                copy,
            })
            .collect())
    }

    pub async fn copy_detail(
        store: &dyn CatalogStore,
        id: Uuid,
    ) -> Result<Option<CopyView>, AppError> {
        let Some(copy) = store.find_book_instance(id).await? else {
            return Ok(None);
        };
        let book = store.find_book(copy.book).await?;
        Ok(Some(CopyView { copy, book }))
    }

    pub async fn book_choices(store: &dyn CatalogStore) -> Result<BookChoices, AppError> {
        let (authors, genres) = tokio::try_join!(store.list_authors(), store.list_genres())?;
        Ok(BookChoices { authors, genres })
    }

    /// The book being edited alongside the form options.
    pub async fn book_edit(
        store: &dyn CatalogStore,
        id: Uuid,
    ) -> Result<Option<(Book, BookChoices)>, AppError> {
        let (book, authors, genres) = tokio::try_join!(
            store.find_book(id),
            store.list_authors(),
            store.list_genres(),
        )?;
        Ok(book.map(|book| (book, BookChoices { authors, genres })))
    }

    /// The copy being edited alongside every book to choose from.
    pub async fn copy_edit(
        store: &dyn CatalogStore,
        id: Uuid,
    ) -> Result<Option<(BookInstance, Vec<Book>)>, AppError> {
        let (copy, books) = tokio::try_join!(
            store.find_book_instance(id),
            store.list_books(BookFilter::All),
        )?;
        Ok(copy.map(|copy| (copy, books)))
    }
}
