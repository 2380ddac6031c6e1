//! Page handlers. Each entity has list, detail, create, update and delete
//! flows; every successful write ends in a redirect.

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod index;

use crate::error::AppError;
use crate::service::Rejected;
use uuid::Uuid;

pub const AUTHORS: &str = "/catalog/authors";
pub const GENRES: &str = "/catalog/genres";
pub const BOOKS: &str = "/catalog/books";
pub const BOOK_INSTANCES: &str = "/catalog/bookinstances";

/// Path id; malformed ids are treated like unknown ones.
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

fn not_found(kind: &str, raw: &str) -> AppError {
    AppError::NotFound(format!("{} {}", kind, raw))
}

/// Resolve a path id or fail with 404.
fn require_id(kind: &str, raw: &str) -> Result<Uuid, AppError> {
    parse_id(raw).ok_or_else(|| not_found(kind, raw))
}

fn log_rejected<F>(kind: &'static str, rejected: &Rejected<F>) {
    tracing::warn!(
        kind,
        errors = rejected.errors.len(),
        fields = ?rejected.errors.iter().map(|e| e.field).collect::<Vec<_>>(),
        "form rejected"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn malformed_ids_are_not_found() {
        assert_eq!(parse_id("not-a-uuid"), None);
        let err = require_id("author", "42").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
