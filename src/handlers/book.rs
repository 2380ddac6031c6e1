//! Book pages. The form's author select and genre checkboxes are built from
//! the records that exist when the page is rendered.

use super::{log_rejected, parse_id, require_id, BOOKS};
use crate::error::AppError;
use crate::extractors::FormFields;
use crate::response::{page, rejected_form, see_other};
use crate::service::{BookChoices, BookForm, FieldErrors, IntegrityGuard, Rejected, ViewAssembly};
use crate::state::AppState;
use crate::store::DeleteOutcome;
use crate::views;
use axum::{
    extract::{Path, State},
    response::Response,
};

const KIND: &str = "book";

fn render_rejected(title: &str, rejected: Rejected<BookForm>, choices: &BookChoices) -> Response {
    log_rejected(KIND, &rejected);
    rejected_form(views::book::form(title, &rejected.form, choices, &rejected.errors))
}

pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let entries = ViewAssembly::book_list(state.store()).await?;
    Ok(page(views::book::list(&entries)))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let id = require_id(KIND, &raw)?;
    let detail = ViewAssembly::book_detail(state.store(), id)
        .await?
        .ok_or_else(|| super::not_found(KIND, &raw))?;
    Ok(page(views::book::detail(&detail)))
}

pub async fn create_form(State(state): State<AppState>) -> Result<Response, AppError> {
    let choices = ViewAssembly::book_choices(state.store()).await?;
    Ok(page(views::book::form(
        "Create Book",
        &BookForm::default(),
        &choices,
        &FieldErrors::new(),
    )))
}

pub async fn create(
    State(state): State<AppState>,
    fields: FormFields,
) -> Result<Response, AppError> {
    let choices = ViewAssembly::book_choices(state.store()).await?;
    let record = match BookForm::parse(&fields, &choices.authors, &choices.genres) {
        Ok(record) => record,
        Err(rejected) => return Ok(render_rejected("Create Book", rejected, &choices)),
    };
    let book = state.store().create_book(record).await?;
    tracing::info!(id = %book.id, title = %book.title, genres = book.genre.len(), "book created");
    Ok(see_other(&book.url()))
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&raw) else {
        return Ok(see_other(BOOKS));
    };
    let Some(book) = state.store().find_book(id).await? else {
        return Ok(see_other(BOOKS));
    };
    let copies = IntegrityGuard::book_dependents(state.store(), id).await?;
    Ok(page(views::book::delete(&book, &copies)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&raw) else {
        return Ok(see_other(BOOKS));
    };
    match IntegrityGuard::delete_book(state.store(), id).await? {
        DeleteOutcome::Deleted | DeleteOutcome::NotFound => Ok(see_other(BOOKS)),
        DeleteOutcome::Blocked(copies) => match state.store().find_book(id).await? {
            Some(book) => Ok(page(views::book::delete(&book, &copies))),
            None => Ok(see_other(BOOKS)),
        },
    }
}

pub async fn update_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let id = require_id(KIND, &raw)?;
    let (book, choices) = ViewAssembly::book_edit(state.store(), id)
        .await?
        .ok_or_else(|| super::not_found(KIND, &raw))?;
    Ok(page(views::book::form(
        "Update Book",
        &BookForm::from(&book),
        &choices,
        &FieldErrors::new(),
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    fields: FormFields,
) -> Result<Response, AppError> {
    let id = require_id(KIND, &raw)?;
    let (_, choices) = ViewAssembly::book_edit(state.store(), id)
        .await?
        .ok_or_else(|| super::not_found(KIND, &raw))?;
    let record = match BookForm::parse(&fields, &choices.authors, &choices.genres) {
        Ok(record) => record,
        Err(rejected) => return Ok(render_rejected("Update Book", rejected, &choices)),
    };
    let book = state.store().update_book(id, record).await?;
    tracing::info!(id = %book.id, "book updated");
    Ok(see_other(&book.url()))
}
