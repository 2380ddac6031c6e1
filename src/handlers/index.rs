use crate::error::AppError;
use crate::response::{page, see_other};
use crate::service::ViewAssembly;
use crate::state::AppState;
use crate::views;
use axum::{extract::State, response::Response};

pub async fn root() -> Response {
    see_other("/catalog")
}

pub async fn home(State(state): State<AppState>) -> Result<Response, AppError> {
    let counts = ViewAssembly::dashboard(state.store()).await?;
    Ok(page(views::index::home(&counts)))
}
