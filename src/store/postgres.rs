//! PostgreSQL store. Tables live in a configurable schema (see [`crate::migration`]).

use super::{BookFilter, CatalogStore, CopyFilter, DeleteOutcome};
use crate::config::AppConfig;
use crate::error::StoreError;
use crate::migration::{
    apply_migrations, ensure_database_exists, qualified_table, AUTHORS, BOOKS, BOOK_GENRES,
    BOOK_INSTANCES, GENRES,
};
use crate::model::{
    Author, AuthorRecord, Book, BookInstance, BookInstanceRecord, BookRecord, BookStatus, Genre,
    GenreRecord,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// ORDER BY terms matching [`super::text_order`] for a text column.
fn text_order_by(column: &str) -> String {
    format!(r#"lower({column}) COLLATE "C", {column} COLLATE "C""#)
}

#[derive(sqlx::FromRow)]
struct AuthorRow {
    id: Uuid,
    first_name: String,
    family_name: String,
    date_of_birth: Option<NaiveDate>,
    date_of_death: Option<NaiveDate>,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Author {
            id: row.id,
            first_name: row.first_name,
            family_name: row.family_name,
            date_of_birth: row.date_of_birth,
            date_of_death: row.date_of_death,
        }
    }
}

#[derive(sqlx::FromRow)]
struct GenreRow {
    id: Uuid,
    name: String,
}

impl From<GenreRow> for Genre {
    fn from(row: GenreRow) -> Self {
        Genre {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    author_id: Uuid,
    summary: String,
    isbn: String,
    genre_ids: Vec<Uuid>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            author: row.author_id,
            summary: row.summary,
            isbn: row.isbn,
            genre: row.genre_ids,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CopyRow {
    id: Uuid,
    book_id: Uuid,
    imprint: String,
    status: String,
    due_back: Option<NaiveDate>,
}

impl TryFrom<CopyRow> for BookInstance {
    type Error = StoreError;

    fn try_from(row: CopyRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BookStatus>()
            .map_err(|e| StoreError::Db(sqlx::Error::Decode(Box::new(e))))?;
        Ok(BookInstance {
            id: row.id,
            book: row.book_id,
            imprint: row.imprint,
            status,
            due_back: row.due_back,
        })
    }
}

/// Map constraint violations on writes to store errors.
fn write_error(err: sqlx::Error, kind: &'static str, value: &str) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Duplicate {
                kind,
                value: value.to_string(),
            };
        }
        if db.is_foreign_key_violation() {
            return StoreError::MissingReference {
                kind,
                id: db.constraint().unwrap_or(value).to_string(),
            };
        }
    }
    StoreError::Db(err)
}

fn not_found(kind: &'static str, id: Uuid) -> StoreError {
    StoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    schema: String,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgCatalogStore {
            pool,
            schema: schema.into(),
        }
    }

    /// Create the database if needed, open the pool and apply migrations.
    pub async fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        ensure_database_exists(&config.database_url).await?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        apply_migrations(&pool, &config.schema).await?;
        Ok(Self::new(pool, config.schema.clone()))
    }

    fn table(&self, name: &str) -> String {
        qualified_table(&self.schema, name)
    }

    fn author_select(&self) -> String {
        format!(
            "SELECT id, first_name, family_name, date_of_birth, date_of_death FROM {}",
            self.table(AUTHORS)
        )
    }

    /// Books with their ordered genre ids; `filter` is a WHERE clause over alias `b`.
    fn book_select(&self, filter: &str) -> String {
        format!(
            r#"SELECT b.id, b.title, b.author_id, b.summary, b.isbn,
                COALESCE(array_agg(bg.genre_id ORDER BY bg.position)
                    FILTER (WHERE bg.genre_id IS NOT NULL), '{{}}') AS genre_ids
            FROM {} b LEFT JOIN {} bg ON bg.book_id = b.id
            {}
            GROUP BY b.id
            ORDER BY {}, b.id"#,
            self.table(BOOKS),
            self.table(BOOK_GENRES),
            filter,
            text_order_by("b.title")
        )
    }

    /// Copies ordered by parent title; `filter` is a WHERE clause over alias `c`.
    fn copy_select(&self, filter: &str) -> String {
        format!(
            r#"SELECT c.id, c.book_id, c.imprint, c.status, c.due_back
            FROM {} c JOIN {} b ON b.id = c.book_id
            {}
            ORDER BY {}, {}, c.id"#,
            self.table(BOOK_INSTANCES),
            self.table(BOOKS),
            filter,
            text_order_by("b.title"),
            text_order_by("c.imprint")
        )
    }

    async fn fetch_books(
        &self,
        conn: &mut PgConnection,
        filter: BookFilter,
    ) -> Result<Vec<Book>, StoreError> {
        let (clause, param) = match filter {
            BookFilter::All => (String::new(), None),
            BookFilter::ByAuthor(id) => ("WHERE b.author_id = $1".to_string(), Some(id)),
            BookFilter::ByGenre(id) => (
                format!(
                    "WHERE b.id IN (SELECT book_id FROM {} WHERE genre_id = $1)",
                    self.table(BOOK_GENRES)
                ),
                Some(id),
            ),
        };
        let sql = self.book_select(&clause);
        tracing::debug!(sql = %sql, param = ?param, "query");
        let mut query = sqlx::query_as::<_, BookRow>(&sql);
        if let Some(id) = param {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&mut *conn).await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn fetch_copies(
        &self,
        conn: &mut PgConnection,
        filter: CopyFilter,
    ) -> Result<Vec<BookInstance>, StoreError> {
        let sql = match filter {
            CopyFilter::All => self.copy_select(""),
            CopyFilter::ByBook(_) => self.copy_select("WHERE c.book_id = $1"),
            CopyFilter::ByStatus(_) => self.copy_select("WHERE c.status = $1"),
        };
        tracing::debug!(sql = %sql, filter = ?filter, "query");
        let query = sqlx::query_as::<_, CopyRow>(&sql);
        let query = match filter {
            CopyFilter::All => query,
            CopyFilter::ByBook(id) => query.bind(id),
            CopyFilter::ByStatus(status) => query.bind(status.as_str()),
        };
        let rows = query.fetch_all(&mut *conn).await?;
        rows.into_iter().map(BookInstance::try_from).collect()
    }

    async fn insert_book_genres(
        &self,
        conn: &mut PgConnection,
        book_id: Uuid,
        genre: &[Uuid],
    ) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {} (book_id, genre_id, position) VALUES ($1, $2, $3)",
            self.table(BOOK_GENRES)
        );
        for (position, genre_id) in genre.iter().enumerate() {
            tracing::debug!(sql = %sql, %book_id, %genre_id, "query (tx)");
            sqlx::query(&sql)
                .bind(book_id)
                .bind(genre_id)
                .bind(position as i32)
                .execute(&mut *conn)
                .await
                .map_err(|e| write_error(e, "genre", &genre_id.to_string()))?;
        }
        Ok(())
    }

    /// Lock the row `id` in `table` for the rest of the transaction. Returns false when absent.
    async fn lock_row(
        &self,
        conn: &mut PgConnection,
        table: &str,
        id: Uuid,
    ) -> Result<bool, StoreError> {
        let sql = format!("SELECT id FROM {} WHERE id = $1 FOR UPDATE", self.table(table));
        tracing::debug!(sql = %sql, %id, "query (tx)");
        let row: Option<(Uuid,)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.is_some())
    }

    async fn delete_row(
        &self,
        conn: &mut PgConnection,
        table: &str,
        id: Uuid,
    ) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table(table));
        tracing::debug!(sql = %sql, %id, "query");
        let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    async fn count(&self, sql: &str, param: Option<&str>) -> Result<u64, StoreError> {
        tracing::debug!(sql = %sql, param = ?param, "query");
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        if let Some(p) = param {
            query = query.bind(p);
        }
        let n = query.fetch_one(&self.pool).await?;
        Ok(n.max(0) as u64)
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn create_author(&self, record: AuthorRecord) -> Result<Author, StoreError> {
        record.check_required()?;
        let sql = format!(
            "INSERT INTO {} (id, first_name, family_name, date_of_birth, date_of_death) \
             VALUES ($1, $2, $3, $4, $5)",
            self.table(AUTHORS)
        );
        let author = record.with_id(Uuid::new_v4());
        tracing::debug!(sql = %sql, id = %author.id, "query");
        sqlx::query(&sql)
            .bind(author.id)
            .bind(&author.first_name)
            .bind(&author.family_name)
            .bind(author.date_of_birth)
            .bind(author.date_of_death)
            .execute(&self.pool)
            .await?;
        Ok(author)
    }

    async fn find_author(&self, id: Uuid) -> Result<Option<Author>, StoreError> {
        let sql = format!("{} WHERE id = $1", self.author_select());
        tracing::debug!(sql = %sql, %id, "query");
        let row = sqlx::query_as::<_, AuthorRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Author::from))
    }

    async fn list_authors(&self) -> Result<Vec<Author>, StoreError> {
        let sql = format!(
            "{} ORDER BY {}, {}, id",
            self.author_select(),
            text_order_by("family_name"),
            text_order_by("first_name")
        );
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query_as::<_, AuthorRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Author::from).collect())
    }

    async fn update_author(&self, id: Uuid, record: AuthorRecord) -> Result<Author, StoreError> {
        record.check_required()?;
        let sql = format!(
            "UPDATE {} SET first_name = $2, family_name = $3, date_of_birth = $4, date_of_death = $5 \
             WHERE id = $1",
            self.table(AUTHORS)
        );
        tracing::debug!(sql = %sql, %id, "query");
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(&record.first_name)
            .bind(&record.family_name)
            .bind(record.date_of_birth)
            .bind(record.date_of_death)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found("author", id));
        }
        Ok(record.with_id(id))
    }

    async fn delete_author_if_unreferenced(
        &self,
        id: Uuid,
    ) -> Result<DeleteOutcome<Book>, StoreError> {
        let mut tx = self.pool.begin().await?;
        if !self.lock_row(&mut tx, AUTHORS, id).await? {
            return Ok(DeleteOutcome::NotFound);
        }
        let dependents = self.fetch_books(&mut tx, BookFilter::ByAuthor(id)).await?;
        if !dependents.is_empty() {
            tx.rollback().await?;
            return Ok(DeleteOutcome::Blocked(dependents));
        }
        self.delete_row(&mut tx, AUTHORS, id).await?;
        tx.commit().await?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn count_authors(&self) -> Result<u64, StoreError> {
        self.count(&format!("SELECT COUNT(*) FROM {}", self.table(AUTHORS)), None)
            .await
    }

    async fn create_genre(&self, record: GenreRecord) -> Result<Genre, StoreError> {
        record.check_required()?;
        let sql = format!("INSERT INTO {} (id, name) VALUES ($1, $2)", self.table(GENRES));
        let genre = record.with_id(Uuid::new_v4());
        tracing::debug!(sql = %sql, id = %genre.id, name = %genre.name, "query");
        sqlx::query(&sql)
            .bind(genre.id)
            .bind(&genre.name)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, "genre", &genre.name))?;
        Ok(genre)
    }

    async fn find_genre(&self, id: Uuid) -> Result<Option<Genre>, StoreError> {
        let sql = format!("SELECT id, name FROM {} WHERE id = $1", self.table(GENRES));
        tracing::debug!(sql = %sql, %id, "query");
        let row = sqlx::query_as::<_, GenreRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Genre::from))
    }

    async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>, StoreError> {
        let sql = format!(
            "SELECT id, name FROM {} WHERE lower(name) = lower($1)",
            self.table(GENRES)
        );
        tracing::debug!(sql = %sql, name = %name, "query");
        let row = sqlx::query_as::<_, GenreRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Genre::from))
    }

    async fn find_genres(&self, ids: &[Uuid]) -> Result<Vec<Genre>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, name FROM {} WHERE id = ANY($1) ORDER BY {}, id",
            self.table(GENRES),
            text_order_by("name")
        );
        tracing::debug!(sql = %sql, ids = ?ids, "query");
        let rows = sqlx::query_as::<_, GenreRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Genre::from).collect())
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, StoreError> {
        let sql = format!(
            "SELECT id, name FROM {} ORDER BY {}, id",
            self.table(GENRES),
            text_order_by("name")
        );
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query_as::<_, GenreRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Genre::from).collect())
    }

    async fn update_genre(&self, id: Uuid, record: GenreRecord) -> Result<Genre, StoreError> {
        record.check_required()?;
        let sql = format!("UPDATE {} SET name = $2 WHERE id = $1", self.table(GENRES));
        tracing::debug!(sql = %sql, %id, "query");
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(&record.name)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, "genre", &record.name))?;
        if result.rows_affected() == 0 {
            return Err(not_found("genre", id));
        }
        Ok(record.with_id(id))
    }

    async fn delete_genre_if_unreferenced(
        &self,
        id: Uuid,
    ) -> Result<DeleteOutcome<Book>, StoreError> {
        let mut tx = self.pool.begin().await?;
        if !self.lock_row(&mut tx, GENRES, id).await? {
            return Ok(DeleteOutcome::NotFound);
        }
        let dependents = self.fetch_books(&mut tx, BookFilter::ByGenre(id)).await?;
        if !dependents.is_empty() {
            tx.rollback().await?;
            return Ok(DeleteOutcome::Blocked(dependents));
        }
        self.delete_row(&mut tx, GENRES, id).await?;
        tx.commit().await?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn count_genres(&self) -> Result<u64, StoreError> {
        self.count(&format!("SELECT COUNT(*) FROM {}", self.table(GENRES)), None)
            .await
    }

    async fn create_book(&self, record: BookRecord) -> Result<Book, StoreError> {
        record.check_required()?;
        let book = record.with_id(Uuid::new_v4());
        let sql = format!(
            "INSERT INTO {} (id, title, author_id, summary, isbn) VALUES ($1, $2, $3, $4, $5)",
            self.table(BOOKS)
        );
        let mut tx = self.pool.begin().await?;
        tracing::debug!(sql = %sql, id = %book.id, "query (tx)");
        sqlx::query(&sql)
            .bind(book.id)
            .bind(&book.title)
            .bind(book.author)
            .bind(&book.summary)
            .bind(&book.isbn)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, "author", &book.author.to_string()))?;
        self.insert_book_genres(&mut tx, book.id, &book.genre).await?;
        tx.commit().await?;
        Ok(book)
    }

    async fn find_book(&self, id: Uuid) -> Result<Option<Book>, StoreError> {
        let sql = self.book_select("WHERE b.id = $1");
        tracing::debug!(sql = %sql, %id, "query");
        let row = sqlx::query_as::<_, BookRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Book::from))
    }

    async fn list_books(&self, filter: BookFilter) -> Result<Vec<Book>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        self.fetch_books(&mut conn, filter).await
    }

    async fn update_book(&self, id: Uuid, record: BookRecord) -> Result<Book, StoreError> {
        record.check_required()?;
        let sql = format!(
            "UPDATE {} SET title = $2, author_id = $3, summary = $4, isbn = $5 WHERE id = $1",
            self.table(BOOKS)
        );
        let mut tx = self.pool.begin().await?;
        tracing::debug!(sql = %sql, %id, "query (tx)");
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(&record.title)
            .bind(record.author)
            .bind(&record.summary)
            .bind(&record.isbn)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, "author", &record.author.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(not_found("book", id));
        }
        let clear = format!("DELETE FROM {} WHERE book_id = $1", self.table(BOOK_GENRES));
        tracing::debug!(sql = %clear, %id, "query (tx)");
        sqlx::query(&clear).bind(id).execute(&mut *tx).await?;
        self.insert_book_genres(&mut tx, id, &record.genre).await?;
        tx.commit().await?;
        Ok(record.with_id(id))
    }

    async fn delete_book_if_unreferenced(
        &self,
        id: Uuid,
    ) -> Result<DeleteOutcome<BookInstance>, StoreError> {
        let mut tx = self.pool.begin().await?;
        if !self.lock_row(&mut tx, BOOKS, id).await? {
            return Ok(DeleteOutcome::NotFound);
        }
        let dependents = self.fetch_copies(&mut tx, CopyFilter::ByBook(id)).await?;
        if !dependents.is_empty() {
            tx.rollback().await?;
            return Ok(DeleteOutcome::Blocked(dependents));
        }
        self.delete_row(&mut tx, BOOKS, id).await?;
        tx.commit().await?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn count_books(&self) -> Result<u64, StoreError> {
        self.count(&format!("SELECT COUNT(*) FROM {}", self.table(BOOKS)), None)
            .await
    }

    async fn create_book_instance(
        &self,
        record: BookInstanceRecord,
    ) -> Result<BookInstance, StoreError> {
        record.check_required()?;
        let copy = record.with_id(Uuid::new_v4());
        let sql = format!(
            "INSERT INTO {} (id, book_id, imprint, status, due_back) VALUES ($1, $2, $3, $4, $5)",
            self.table(BOOK_INSTANCES)
        );
        tracing::debug!(sql = %sql, id = %copy.id, "query");
        sqlx::query(&sql)
            .bind(copy.id)
            .bind(copy.book)
            .bind(&copy.imprint)
            .bind(copy.status.as_str())
            .bind(copy.due_back)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, "book", &copy.book.to_string()))?;
        Ok(copy)
    }

    async fn find_book_instance(&self, id: Uuid) -> Result<Option<BookInstance>, StoreError> {
        let sql = format!(
            "SELECT id, book_id, imprint, status, due_back FROM {} WHERE id = $1",
            self.table(BOOK_INSTANCES)
        );
        tracing::debug!(sql = %sql, %id, "query");
        let row = sqlx::query_as::<_, CopyRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(BookInstance::try_from).transpose()
    }

    async fn list_book_instances(
        &self,
        filter: CopyFilter,
    ) -> Result<Vec<BookInstance>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        self.fetch_copies(&mut conn, filter).await
    }

    async fn update_book_instance(
        &self,
        id: Uuid,
        record: BookInstanceRecord,
    ) -> Result<BookInstance, StoreError> {
        record.check_required()?;
        let sql = format!(
            "UPDATE {} SET book_id = $2, imprint = $3, status = $4, due_back = $5 WHERE id = $1",
            self.table(BOOK_INSTANCES)
        );
        tracing::debug!(sql = %sql, %id, "query");
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(record.book)
            .bind(&record.imprint)
            .bind(record.status.as_str())
            .bind(record.due_back)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, "book", &record.book.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(not_found("book instance", id));
        }
        Ok(record.with_id(id))
    }

    async fn delete_book_instance(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(self.delete_row(&mut conn, BOOK_INSTANCES, id).await? > 0)
    }

    async fn count_book_instances(&self, filter: CopyFilter) -> Result<u64, StoreError> {
        let table = self.table(BOOK_INSTANCES);
        match filter {
            CopyFilter::All => self.count(&format!("SELECT COUNT(*) FROM {}", table), None).await,
            CopyFilter::ByStatus(status) => {
                self.count(
                    &format!("SELECT COUNT(*) FROM {} WHERE status = $1", table),
                    Some(status.as_str()),
                )
                .await
            }
            CopyFilter::ByBook(book) => {
                let sql = format!("SELECT COUNT(*) FROM {} WHERE book_id = $1", table);
                tracing::debug!(sql = %sql, %book, "query");
                let n: i64 = sqlx::query_scalar(&sql)
                    .bind(book)
                    .fetch_one(&self.pool)
                    .await?;
                Ok(n.max(0) as u64)
            }
        }
    }
}
