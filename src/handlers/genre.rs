//! Genre pages. Names are unique ignoring case: creating an existing name
//! lands on the existing genre, renaming onto one is a form error.

use super::{log_rejected, parse_id, require_id, GENRES};
use crate::error::{AppError, StoreError};
use crate::extractors::FormFields;
use crate::model::GenreRecord;
use crate::response::{page, rejected_form, see_other};
use crate::service::{FieldErrors, GenreForm, IntegrityGuard, Rejected, ViewAssembly};
use crate::state::AppState;
use crate::store::DeleteOutcome;
use crate::views;
use axum::{
    extract::{Path, State},
    response::Response,
};

const KIND: &str = "genre";

fn render_rejected(title: &str, rejected: Rejected<GenreForm>) -> Response {
    log_rejected(KIND, &rejected);
    rejected_form(views::genre::form(title, &rejected.form, &rejected.errors))
}

pub async fn list(State(state): State<AppState>) -> Result<Response, AppError> {
    let genres = state.store().list_genres().await?;
    Ok(page(views::genre::list(&genres)))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let id = require_id(KIND, &raw)?;
    let detail = ViewAssembly::genre_detail(state.store(), id)
        .await?
        .ok_or_else(|| super::not_found(KIND, &raw))?;
    Ok(page(views::genre::detail(&detail)))
}

pub async fn create_form() -> Response {
    page(views::genre::form(
        "Create Genre",
        &GenreForm::default(),
        &FieldErrors::new(),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    fields: FormFields,
) -> Result<Response, AppError> {
    let record = match GenreForm::parse(&fields) {
        Ok(record) => record,
        Err(rejected) => return Ok(render_rejected("Create Genre", rejected)),
    };
    let store = state.store();
    if let Some(existing) = store.find_genre_by_name(&record.name).await? {
        tracing::debug!(id = %existing.id, "genre exists, redirecting");
        return Ok(see_other(&existing.url()));
    }
    match store.create_genre(record.clone()).await {
        Ok(genre) => {
            tracing::info!(id = %genre.id, name = %genre.name, "genre created");
            Ok(see_other(&genre.url()))
        }
        // Another request created the same name between lookup and insert.
        Err(StoreError::Duplicate { .. }) => match store.find_genre_by_name(&record.name).await? {
            Some(existing) => Ok(see_other(&existing.url())),
            None => Ok(render_rejected("Create Genre", GenreForm::name_taken(record))),
        },
        Err(err) => Err(err.into()),
    }
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&raw) else {
        return Ok(see_other(GENRES));
    };
    let Some(genre) = state.store().find_genre(id).await? else {
        return Ok(see_other(GENRES));
    };
    let books = IntegrityGuard::genre_dependents(state.store(), id).await?;
    Ok(page(views::genre::delete(&genre, &books)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&raw) else {
        return Ok(see_other(GENRES));
    };
    match IntegrityGuard::delete_genre(state.store(), id).await? {
        DeleteOutcome::Deleted | DeleteOutcome::NotFound => Ok(see_other(GENRES)),
        DeleteOutcome::Blocked(books) => match state.store().find_genre(id).await? {
            Some(genre) => Ok(page(views::genre::delete(&genre, &books))),
            None => Ok(see_other(GENRES)),
        },
    }
}

pub async fn update_form(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, AppError> {
    let id = require_id(KIND, &raw)?;
    let genre = state
        .store()
        .find_genre(id)
        .await?
        .ok_or_else(|| super::not_found(KIND, &raw))?;
    Ok(page(views::genre::form(
        "Update Genre",
        &GenreForm::from(&genre),
        &FieldErrors::new(),
    )))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    fields: FormFields,
) -> Result<Response, AppError> {
    let id = require_id(KIND, &raw)?;
    if state.store().find_genre(id).await?.is_none() {
        return Err(super::not_found(KIND, &raw));
    }
    let record: GenreRecord = match GenreForm::parse(&fields) {
        Ok(record) => record,
        Err(rejected) => return Ok(render_rejected("Update Genre", rejected)),
    };
    match state.store().update_genre(id, record.clone()).await {
        Ok(genre) => {
            tracing::info!(id = %genre.id, name = %genre.name, "genre updated");
            Ok(see_other(&genre.url()))
        }
        Err(StoreError::Duplicate { .. }) => {
            Ok(render_rejected("Update Genre", GenreForm::name_taken(record)))
        }
        Err(err) => Err(err.into()),
    }
}
