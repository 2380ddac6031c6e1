//! Catalog DDL. Idempotent: every statement is `IF NOT EXISTS`, so it runs on each start.

use crate::error::StoreError;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

pub const AUTHORS: &str = "authors";
pub const GENRES: &str = "genres";
pub const BOOKS: &str = "books";
pub const BOOK_GENRES: &str = "book_genres";
pub const BOOK_INSTANCES: &str = "book_instances";

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Schema-qualified table name, e.g. `"catalog"."books"`.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

/// Create the schema and catalog tables. Foreign keys restrict deletes so that
/// a row lock on the referenced record serializes concurrent dependent inserts
/// against the conditional deletes in [`crate::store::PgCatalogStore`].
pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), StoreError> {
    let authors = qualified_table(schema, AUTHORS);
    let genres = qualified_table(schema, GENRES);
    let books = qualified_table(schema, BOOKS);
    let book_genres = qualified_table(schema, BOOK_GENRES);
    let book_instances = qualified_table(schema, BOOK_INSTANCES);

    let statements = [
        format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                first_name TEXT NOT NULL CHECK (first_name <> ''),
                family_name TEXT NOT NULL CHECK (family_name <> ''),
                date_of_birth DATE,
                date_of_death DATE
            )
            "#,
            authors
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL CHECK (char_length(name) >= 3)
            )
            "#,
            genres
        ),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS genres_name_ci_key ON {} (lower(name))",
            genres
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL CHECK (title <> ''),
                author_id UUID NOT NULL REFERENCES {} (id) ON DELETE RESTRICT,
                summary TEXT NOT NULL CHECK (summary <> ''),
                isbn TEXT NOT NULL CHECK (isbn <> '')
            )
            "#,
            books, authors
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS books_author_id_idx ON {} (author_id)",
            books
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                book_id UUID NOT NULL REFERENCES {} (id) ON DELETE CASCADE,
                genre_id UUID NOT NULL REFERENCES {} (id) ON DELETE RESTRICT,
                position INTEGER NOT NULL,
                PRIMARY KEY (book_id, genre_id)
            )
            "#,
            book_genres, books, genres
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS book_genres_genre_id_idx ON {} (genre_id)",
            book_genres
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                book_id UUID NOT NULL REFERENCES {} (id) ON DELETE RESTRICT,
                imprint TEXT NOT NULL CHECK (imprint <> ''),
                status TEXT NOT NULL DEFAULT 'Maintenance'
                    CHECK (status IN ('Available', 'Maintenance', 'Loaned', 'Reserved')),
                due_back DATE
            )
            "#,
            book_instances, books
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS book_instances_book_id_idx ON {} (book_id)",
            book_instances
        ),
    ];

    for sql in &statements {
        tracing::debug!(sql = %sql.trim(), "migration");
        sqlx::query(sql).execute(pool).await?;
    }
    tracing::info!(schema = %schema, "catalog schema ready");
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url);
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split a connection URL into (admin URL on the `postgres` database, database name).
fn parse_db_name_from_url(url: &str) -> (String, String) {
    let Some(slash) = url.rfind('/') else {
        return (url.to_string(), String::new());
    };
    let path_start = slash + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let mut parts = path_and_query.splitn(2, '?');
    let db_name = parts.next().unwrap_or("").trim().to_string();
    let query = parts.next().map(|q| format!("?{}", q)).unwrap_or_default();
    let base = url.get(..path_start).unwrap_or(url);
    (format!("{}postgres{}", base, query), db_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/library?sslmode=disable");
        assert_eq!(db, "library");
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres?sslmode=disable");
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(qualified_table("catalog", "books"), "\"catalog\".\"books\"");
        assert_eq!(quoted("we\"ird"), "\"we\"\"ird\"");
    }
}
