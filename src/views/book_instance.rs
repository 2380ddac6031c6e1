use super::{delete_form, error_list, input, layout, select, status_badge, submit};
use crate::model::{Book, BookStatus};
use crate::service::{BookInstanceForm, CopyView, FieldErrors};

fn book_link(view: &CopyView) -> String {
    view.book
        .as_ref()
        .map(|b| format!("<a href=\"{}\">{}</a>", b.url(), b.title))
        .unwrap_or_default()
}

fn due_back(view: &CopyView) -> String {
    if view.copy.status == BookStatus::Available {
        String::new()
    } else {
        format!(" (Due: {})", view.copy.due_back_formatted())
    }
}

pub fn list(copies: &[CopyView]) -> String {
    let content = if copies.is_empty() {
        "<p>There are no book copies in this library.</p>".to_string()
    } else {
        let items: String = copies
            .iter()
            .map(|view| {
                let title = view.book.as_ref().map(|b| b.title.as_str()).unwrap_or_default();
                format!(
                    "<li><a href=\"{}\">{} : {}</a> - {}{}</li>",
                    view.copy.url(),
                    title,
                    view.copy.imprint,
                    status_badge(view.copy.status),
                    due_back(view)
                )
            })
            .collect();
        format!("<ul>{}</ul>", items)
    };
    layout("Book Instance List", &content)
}

fn summary(view: &CopyView) -> String {
    let copy = &view.copy;
    let mut out = format!(
        "<p><strong>Title:</strong> {}</p><p><strong>Imprint:</strong> {}</p><p><strong>Status:</strong> {}</p>",
        book_link(view),
        copy.imprint,
        status_badge(copy.status)
    );
    if copy.status != BookStatus::Available {
        out.push_str(&format!("<p><strong>Due back:</strong> {}</p>", copy.due_back_formatted()));
    }
    out
}

pub fn detail(view: &CopyView) -> String {
    layout(&format!("ID: {}", view.copy.id), &summary(view))
}

pub fn form(title: &str, form: &BookInstanceForm, books: &[Book], errors: &FieldErrors) -> String {
    let book_select = select(
        "Book",
        "book",
        Some("--Please select a book--"),
        books.iter().map(|b| (b.id.to_string(), b.title.clone())),
        &form.book,
    );
    let status_select = select(
        "Status",
        "status",
        None,
        BookStatus::ALL
            .into_iter()
            .map(|s| (s.to_string(), s.to_string())),
        form.selected_status().as_str(),
    );
    let content = format!(
        "<form method=\"POST\" action=\"\">{}{}{}{}{}</form>{}",
        book_select,
        input("Imprint", "imprint", "text", &form.imprint, true),
        input("Date when book available", "due_back", "date", &form.due_back, false),
        status_select,
        submit(),
        error_list(errors)
    );
    layout(title, &content)
}

/// Copies are never referenced, so the confirmation always offers the delete.
pub fn delete(view: &CopyView) -> String {
    let content = format!(
        "{}{}",
        summary(view),
        delete_form("Do you really want to delete this Book Instance?")
    );
    layout("Delete BookInstance", &content)
}
