//! HTML pages. Stored text was escaped when it was validated and is written
//! out verbatim; anything else (error messages, ids) goes through [`text`].

pub mod author;
pub mod book;
pub mod book_instance;
pub mod error;
pub mod genre;
pub mod index;

use crate::model::BookStatus;
use crate::service::validation::{escape, FieldErrors};

const NAV: &[(&str, &str)] = &[
    ("/catalog", "Home"),
    ("/catalog/books", "All books"),
    ("/catalog/authors", "All authors"),
    ("/catalog/genres", "All genres"),
    ("/catalog/bookinstances", "All book-instances"),
    ("/catalog/author/create", "Create new author"),
    ("/catalog/genre/create", "Create new genre"),
    ("/catalog/book/create", "Create new book"),
    ("/catalog/bookinstance/create", "Create new book instance (copy)"),
];

/// Escape text that did not pass through form validation.
pub fn text(s: &str) -> String {
    escape(s)
}

/// Full document around `content`.
pub fn layout(title: &str, content: &str) -> String {
    let nav: String = NAV
        .iter()
        .map(|(href, label)| format!("<li><a href=\"{}\">{}</a></li>", href, label))
        .collect();
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n</head>\n<body>\n<nav><ul class=\"sidebar-nav\">{nav}</ul></nav>\n\
         <main>\n<h1>{title}</h1>\n{content}\n</main>\n</body>\n</html>\n",
        title = title,
        nav = nav,
        content = content
    )
}

/// Every violation, in submission order.
pub(crate) fn error_list(errors: &FieldErrors) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li data-field=\"{}\">{}</li>", e.field, e.message))
        .collect();
    format!("<ul class=\"errors\">{}</ul>", items)
}

/// Labelled `<input>`; `value` is already escaped.
pub(crate) fn input(label: &str, name: &str, kind: &str, value: &str, required: bool) -> String {
    format!(
        "<div class=\"form-group\"><label for=\"{name}\">{label}:</label>\
         <input id=\"{name}\" type=\"{kind}\" name=\"{name}\" value=\"{value}\"{required}></div>",
        name = name,
        label = label,
        kind = kind,
        value = value,
        required = if required { " required" } else { "" }
    )
}

pub(crate) fn textarea(label: &str, name: &str, value: &str) -> String {
    format!(
        "<div class=\"form-group\"><label for=\"{name}\">{label}:</label>\
         <textarea id=\"{name}\" name=\"{name}\" required>{value}</textarea></div>",
        name = name,
        label = label,
        value = value
    )
}

/// `<select>` with one option per `(value, label)`; `selected` marks the current value.
pub(crate) fn select(
    label: &str,
    name: &str,
    placeholder: Option<&str>,
    options: impl IntoIterator<Item = (String, String)>,
    selected: &str,
) -> String {
    let mut out = format!(
        "<div class=\"form-group\"><label for=\"{name}\">{label}:</label><select id=\"{name}\" name=\"{name}\">",
        name = name,
        label = label
    );
    if let Some(placeholder) = placeholder {
        out.push_str(&format!("<option value=\"\">{}</option>", placeholder));
    }
    for (value, text) in options {
        let mark = if value == selected { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            value, mark, text
        ));
    }
    out.push_str("</select></div>");
    out
}

pub(crate) fn submit() -> &'static str {
    "<button type=\"submit\">Submit</button>"
}

/// Status label with the class the stylesheet colours it by.
pub(crate) fn status_badge(status: BookStatus) -> String {
    let class = match status {
        BookStatus::Available => "text-success",
        BookStatus::Maintenance => "text-danger",
        BookStatus::Loaned | BookStatus::Reserved => "text-warning",
    };
    format!("<span class=\"{}\">{}</span>", class, status)
}

/// Confirmation form posting back to the current URL.
pub(crate) fn delete_form(question: &str) -> String {
    format!(
        "<p>{}</p><form method=\"POST\" action=\"\"><button type=\"submit\">Delete</button></form>",
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_wraps_content() {
        let html = layout("Author List", "<ul></ul>");
        assert!(html.contains("<title>Author List</title>"));
        assert!(html.contains("<h1>Author List</h1>"));
        assert!(html.contains("href=\"/catalog/bookinstances\""));
    }

    #[test]
    fn select_marks_current_value() {
        let html = select(
            "Status",
            "status",
            None,
            BookStatus::ALL
                .into_iter()
                .map(|s| (s.to_string(), s.to_string())),
            "Loaned",
        );
        assert!(html.contains("<option value=\"Loaned\" selected>Loaned</option>"));
        assert!(html.contains("<option value=\"Available\">Available</option>"));
    }

    #[test]
    fn error_list_keeps_every_message() {
        let mut errors = FieldErrors::new();
        errors.push("first_name", "First name is required.");
        errors.push("first_name", "First name must be alphanumeric.");
        let html = error_list(&errors);
        assert!(html.contains("First name is required."));
        assert!(html.contains("First name must be alphanumeric."));
        assert_eq!(error_list(&FieldErrors::new()), "");
    }
}
