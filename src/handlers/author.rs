//! Author pages.

use super::{log_rejected, parse_id, require_id, AUTHORS};
use crate::error::AppError;
use crate::extractors::FormFields;
use crate::response::{page, rejected_form, see_other};
use crate::service::{AuthorForm, FieldErrors, IntegrityGuard, Rejected, ViewAssembly};
use crate::state::AppState;
use crate::store::DeleteOutcome;
use crate::views;
use axum::{
    extract::{Path, State},
    response::Response,
};

const KIND: &str = "author";

pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let authors = state.store().list_authors().await?;
    Ok(page(views::author::list(&authors)))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let id = require_id(KIND, &raw)?;
    let detail = ViewAssembly::author_detail(state.store(), id)
        .await?
        .ok_or_else(|| super::not_found(KIND, &raw))?;
    Ok(page(views::author::detail(&detail)))
}

pub async fn create_form() -> Response {
    page(views::author::form(
        "Create Author",
        &AuthorForm::default(),
        &FieldErrors::new(),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    fields: FormFields,
) -> Result<Response, AppError> {
    let record = match AuthorForm::parse(&fields) {
        Ok(record) => record,
        Err(rejected) => {
            log_rejected(KIND, &rejected);
            let Rejected { form, errors } = rejected;
            return Ok(rejected_form(views::author::form("Create Author", &form, &errors)));
        }
    };
    let author = state.store().create_author(record).await?;
    tracing::info!(id = %author.id, name = %author.name(), "author created");
    Ok(see_other(&author.url()))
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&raw) else {
        return Ok(see_other(AUTHORS));
    };
    let Some(author) = state.store().find_author(id).await? else {
        return Ok(see_other(AUTHORS));
    };
    let books = IntegrityGuard::author_dependents(state.store(), id).await?;
    Ok(page(views::author::delete(&author, &books)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&raw) else {
        return Ok(see_other(AUTHORS));
    };
    match IntegrityGuard::delete_author(state.store(), id).await? {
        DeleteOutcome::Deleted | DeleteOutcome::NotFound => Ok(see_other(AUTHORS)),
        DeleteOutcome::Blocked(books) => match state.store().find_author(id).await? {
            Some(author) => Ok(page(views::author::delete(&author, &books))),
            None => Ok(see_other(AUTHORS)),
        },
    }
}

pub async fn update_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let id = require_id(KIND, &raw)?;
    let author = state
        .store()
        .find_author(id)
        .await?
        .ok_or_else(|| super::not_found(KIND, &raw))?;
    Ok(page(views::author::form(
        "Update Author",
        &AuthorForm::from(&author),
        &FieldErrors::new(),
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    fields: FormFields,
) -> Result<Response, AppError> {
    let id = require_id(KIND, &raw)?;
    if state.store().find_author(id).await?.is_none() {
        return Err(super::not_found(KIND, &raw));
    }
    let record = match AuthorForm::parse(&fields) {
        Ok(record) => record,
        Err(rejected) => {
            log_rejected(KIND, &rejected);
            let Rejected { form, errors } = rejected;
            return Ok(rejected_form(views::author::form("Update Author", &form, &errors)));
        }
    };
    let author = state.store().update_author(id, record).await?;
    tracing::info!(id = %author.id, "author updated");
    Ok(see_other(&author.url()))
}
