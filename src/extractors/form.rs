//! Decode `application/x-www-form-urlencoded` bodies into an ordered multimap.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    Form,
};

/// Submitted form fields in body order. Repeated names (multi-select
/// checkboxes) keep every value; [`FormFields::get_all`] always yields a
/// sequence, even for a single selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value submitted under `name`; empty values are dropped.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormFields(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[async_trait]
impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BodyRejected {
                status: rejection.status(),
                message: rejection.body_text(),
            })?;
        Ok(FormFields(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;

    async fn decode(body: &'static str) -> FormFields {
        let req = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        FormFields::from_request(req, &()).await.unwrap()
    }

    #[tokio::test]
    async fn single_value_is_a_one_element_sequence() {
        let fields = decode("title=Dune&genre=abc").await;
        assert_eq!(fields.get("title"), Some("Dune"));
        assert_eq!(fields.get_all("genre"), vec!["abc"]);
        assert!(fields.get_all("missing").is_empty());
    }

    #[tokio::test]
    async fn repeated_names_keep_order() {
        let fields = decode("genre=a&title=T&genre=b&genre=").await;
        assert_eq!(fields.get_all("genre"), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn percent_decoding() {
        let fields = decode("first_name=Jos%C3%A9&family_name=de+la+Cruz").await;
        assert_eq!(fields.get("first_name"), Some("José"));
        assert_eq!(fields.get("family_name"), Some("de la Cruz"));
    }

    #[tokio::test]
    async fn wrong_content_type_is_rejected() {
        let req = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let err = FormFields::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
