use super::{layout, text};
use axum::http::StatusCode;

/// Error page. `message` is omitted in production.
pub fn error_page(status: StatusCode, message: Option<&str>) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    let mut content = format!("<h2>{}</h2>", status.as_u16());
    if let Some(message) = message {
        content.push_str(&format!("<p class=\"error-message\">{}</p>", text(message)));
    }
    layout(reason, &content)
}
