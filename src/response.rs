//! Response helpers shared by the page handlers.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

/// 303 See Other to `location`, the post-submit navigation for every form.
pub fn see_other(location: &str) -> Response {
    Redirect::to(location).into_response()
}

/// A full page with 200 OK.
pub fn page(body: String) -> Response {
    Html(body).into_response()
}

/// A form re-rendered after validation failed.
pub fn rejected_form(body: String) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn see_other_sets_location() {
        let response = see_other("/catalog/authors");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/catalog/authors");
    }

    #[test]
    fn rejected_form_is_unprocessable() {
        assert_eq!(
            rejected_form(String::new()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
