//! Book copy pages. Nothing references a copy, so deletes are unconditional.

use super::{log_rejected, parse_id, require_id, BOOK_INSTANCES};
use crate::error::AppError;
use crate::extractors::FormFields;
use crate::model::Book;
use crate::response::{page, rejected_form, see_other};
use crate::service::{BookInstanceForm, FieldErrors, Rejected, ViewAssembly};
use crate::state::AppState;
use crate::store::BookFilter;
use crate::views;
use axum::{
    extract::{Path, State},
    response::Response,
};

const KIND: &str = "bookinstance";

fn render_rejected(title: &str, rejected: Rejected<BookInstanceForm>, books: &[Book]) -> Response {
    log_rejected(KIND, &rejected);
    rejected_form(views::book_instance::form(title, &rejected.form, books, &rejected.errors))
}

pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let copies = ViewAssembly::copy_list(state.store()).await?;
    Ok(page(views::book_instance::list(&copies)))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let id = require_id(KIND, &raw)?;
    let view = ViewAssembly::copy_detail(state.store(), id)
        .await?
        .ok_or_else(|| super::not_found(KIND, &raw))?;
    Ok(page(views::book_instance::detail(&view)))
}

pub async fn create_form(State(state): State<AppState>) -> Result<Response, AppError> {
    let books = state.store().list_books(BookFilter::All).await?;
    Ok(page(views::book_instance::form(
        "Create BookInstance",
        &BookInstanceForm::default(),
        &books,
        &FieldErrors::new(),
    )))
}

pub async fn create(
    State(state): State<AppState>,
    fields: FormFields,
) -> Result<Response, AppError> {
    let books = state.store().list_books(BookFilter::All).await?;
    let record = match BookInstanceForm::parse(&fields, &books) {
        Ok(record) => record,
        Err(rejected) => return Ok(render_rejected("Create BookInstance", rejected, &books)),
    };
    let copy = state.store().create_book_instance(record).await?;
    tracing::info!(id = %copy.id, book = %copy.book, status = %copy.status, "book instance created");
    Ok(see_other(&copy.url()))
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&raw) else {
        return Ok(see_other(BOOK_INSTANCES));
    };
    match ViewAssembly::copy_detail(state.store(), id).await? {
        Some(view) => Ok(page(views::book_instance::delete(&view))),
        None => Ok(see_other(BOOK_INSTANCES)),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&raw) else {
        return Ok(see_other(BOOK_INSTANCES));
    };
    if state.store().delete_book_instance(id).await? {
        tracing::info!(%id, "book instance deleted");
    } else {
        tracing::debug!(%id, "delete of missing book instance");
    }
    Ok(see_other(BOOK_INSTANCES))
}

pub async fn update_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let id = require_id(KIND, &raw)?;
    let (copy, books) = ViewAssembly::copy_edit(state.store(), id)
        .await?
        .ok_or_else(|| super::not_found(KIND, &raw))?;
    Ok(page(views::book_instance::form(
        "Update BookInstance",
        &BookInstanceForm::from(&copy),
        &books,
        &FieldErrors::new(),
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    fields: FormFields,
) -> Result<Response, AppError> {
    let id = require_id(KIND, &raw)?;
    let (_, books) = ViewAssembly::copy_edit(state.store(), id)
        .await?
        .ok_or_else(|| super::not_found(KIND, &raw))?;
    let record = match BookInstanceForm::parse(&fields, &books) {
        Ok(record) => record,
        Err(rejected) => return Ok(render_rejected("Update BookInstance", rejected, &books)),
    };
    let copy = state.store().update_book_instance(id, record).await?;
    tracing::info!(id = %copy.id, status = %copy.status, "book instance updated");
    Ok(see_other(&copy.url()))
}
