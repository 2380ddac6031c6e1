//! Router assembly: catalog pages, operational routes, and the layers around them.

mod catalog;
mod common;

pub use catalog::catalog_routes;
pub use common::common_routes;

use crate::config::AppConfig;
use crate::error::{AppError, ErrorReport};
use crate::state::AppState;
use crate::views;
use axum::{
    extract::{Request, State},
    http::header::CONTENT_TYPE,
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

async fn fallback() -> AppError {
    AppError::NotFound("page".into())
}

/// Turn error responses into the HTML error page. Responses that are already
/// pages (rejected forms) or JSON (readiness) pass through.
async fn error_pages(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }
    let report = response
        .extensions()
        .get::<ErrorReport>()
        .map(|report| report.message.clone());
    let message = match report {
        Some(message) => Some(message),
        None => {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if content_type.starts_with("text/html") || content_type.starts_with("application/json") {
                return response;
            }
            status.canonical_reason().map(str::to_string)
        }
    };
    let message = message.filter(|_| state.expose_errors);
    (status, Html(views::error::error_page(status, message.as_deref()))).into_response()
}

/// The full application router.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .merge(catalog_routes())
        .merge(common_routes())
        .fallback(fallback)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(state.clone(), error_pages))
                .layer(RequestBodyLimitLayer::new(config.body_limit)),
        )
        .with_state(state)
}
