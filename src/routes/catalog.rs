//! Catalog page routes. `/catalog/{entity}/create` is registered beside
//! `/catalog/{entity}/:id`; static segments take precedence.

use crate::handlers::{author, book, book_instance, genre, index};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index::root))
        .route("/catalog", get(index::home))
        .route("/catalog/authors", get(author::list))
        .route(
            "/catalog/author/create",
            get(author::create_form).post(author::create),
        )
        .route("/catalog/author/:id", get(author::detail))
        .route(
            "/catalog/author/:id/delete",
            get(author::delete_form).post(author::delete),
        )
        .route(
            "/catalog/author/:id/update",
            get(author::update_form).post(author::update),
        )
        .route("/catalog/genres", get(genre::list))
        .route(
            "/catalog/genre/create",
            get(genre::create_form).post(genre::create),
        )
        .route("/catalog/genre/:id", get(genre::detail))
        .route(
            "/catalog/genre/:id/delete",
            get(genre::delete_form).post(genre::delete),
        )
        .route(
            "/catalog/genre/:id/update",
            get(genre::update_form).post(genre::update),
        )
        .route("/catalog/books", get(book::list))
        .route(
            "/catalog/book/create",
            get(book::create_form).post(book::create),
        )
        .route("/catalog/book/:id", get(book::detail))
        .route(
            "/catalog/book/:id/delete",
            get(book::delete_form).post(book::delete),
        )
        .route(
            "/catalog/book/:id/update",
            get(book::update_form).post(book::update),
        )
        .route("/catalog/bookinstances", get(book_instance::list))
        .route(
            "/catalog/bookinstance/create",
            get(book_instance::create_form).post(book_instance::create),
        )
        .route("/catalog/bookinstance/:id", get(book_instance::detail))
        .route(
            "/catalog/bookinstance/:id/delete",
            get(book_instance::delete_form).post(book_instance::delete),
        )
        .route(
            "/catalog/bookinstance/:id/update",
            get(book_instance::update_form).post(book_instance::update),
        )
}
