//! Router harness over an in-memory store.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use library_catalog::{app, AppConfig, AppState, MemoryCatalogStore};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub store: Arc<MemoryCatalogStore>,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Id at the end of the redirect target.
    pub fn created_id(&self) -> Uuid {
        let location = self.location.as_deref().expect("redirect location");
        let id = location.rsplit('/').next().expect("id segment");
        Uuid::parse_str(id).expect("uuid in location")
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_errors_exposed(true)
    }

    pub fn with_errors_exposed(expose_errors: bool) -> Self {
        Self::with_config(AppConfig::default(), expose_errors)
    }

    pub fn with_config(config: AppConfig, expose_errors: bool) -> Self {
        let store = Arc::new(MemoryCatalogStore::new());
        let state = AppState::new(store.clone(), expose_errors);
        let router = app(state, &config);
        TestApp { store, router }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::get(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encode(fields)))
            .unwrap();
        self.send(request).await
    }

    /// Form POST that also declares its `Content-Length`.
    pub async fn post_sized(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = encode(fields);
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn create_author(&self, first: &str, family: &str) -> Uuid {
        let response = self
            .post(
                "/catalog/author/create",
                &[("first_name", first), ("family_name", family)],
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        response.created_id()
    }

    pub async fn create_genre(&self, name: &str) -> Uuid {
        let response = self.post("/catalog/genre/create", &[("name", name)]).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        response.created_id()
    }

    pub async fn create_book(&self, title: &str, author: Uuid, genres: &[Uuid]) -> Uuid {
        let author = author.to_string();
        let genres: Vec<String> = genres.iter().map(Uuid::to_string).collect();
        let mut fields = vec![
            ("title", title),
            ("author", author.as_str()),
            ("summary", "A summary"),
            ("isbn", "9780000000000"),
        ];
        fields.extend(genres.iter().map(|g| ("genre", g.as_str())));
        let response = self.post("/catalog/book/create", &fields).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        response.created_id()
    }

    pub async fn create_copy(&self, book: Uuid, imprint: &str, status: Option<&str>) -> Uuid {
        let book = book.to_string();
        let mut fields = vec![("book", book.as_str()), ("imprint", imprint)];
        if let Some(status) = status {
            fields.push(("status", status));
        }
        let response = self.post("/catalog/bookinstance/create", &fields).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        response.created_id()
    }
}

/// `application/x-www-form-urlencoded` body.
fn encode(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", percent(k), percent(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent(s: &str) -> String {
    let mut out = String::new();
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
