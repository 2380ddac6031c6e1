use super::{delete_form, error_list, input, layout, submit};
use crate::model::{Author, Book};
use crate::service::{AuthorDetail, AuthorForm, FieldErrors};

fn lifespan(author: &Author) -> String {
    let span = author.lifespan();
    if span.is_empty() {
        String::new()
    } else {
        format!(" ({})", span)
    }
}

fn book_summaries(books: &[Book]) -> String {
    let items: String = books
        .iter()
        .map(|b| {
            format!(
                "<dt><a href=\"{}\">{}</a></dt><dd>{}</dd>",
                b.url(),
                b.title,
                b.summary
            )
        })
        .collect();
    format!("<dl>{}</dl>", items)
}

pub fn list(authors: &[Author]) -> String {
    let content = if authors.is_empty() {
        "<p>There are no authors.</p>".to_string()
    } else {
        let items: String = authors
            .iter()
            .map(|a| format!("<li><a href=\"{}\">{}</a>{}</li>", a.url(), a.name(), lifespan(a)))
            .collect();
        format!("<ul>{}</ul>", items)
    };
    layout("Author List", &content)
}

pub fn detail(detail: &AuthorDetail) -> String {
    let author = &detail.author;
    let mut content = format!("<p>{}</p><h2>Books</h2>", author.lifespan());
    if detail.books.is_empty() {
        content.push_str("<p>This author has no books.</p>");
    } else {
        content.push_str(&book_summaries(&detail.books));
    }
    layout(&format!("Author: {}", author.name()), &content)
}

pub fn form(title: &str, form: &AuthorForm, errors: &FieldErrors) -> String {
    let content = format!(
        "<form method=\"POST\" action=\"\">{}{}{}{}{}</form>{}",
        input("First Name", "first_name", "text", &form.first_name, true),
        input("Family Name", "family_name", "text", &form.family_name, true),
        input("Date of birth", "date_of_birth", "date", &form.date_of_birth, false),
        input("Date of death", "date_of_death", "date", &form.date_of_death, false),
        submit(),
        error_list(errors)
    );
    layout(title, &content)
}

/// Confirmation page; lists the blocking books when there are any.
pub fn delete(author: &Author, books: &[Book]) -> String {
    let mut content = format!("<h2>{}</h2>", author.name());
    if books.is_empty() {
        content.push_str(&delete_form("Do you really want to delete this Author?"));
    } else {
        content.push_str("<p><strong>Delete the following books before attempting to delete this author.</strong></p>");
        content.push_str(&book_summaries(books));
    }
    layout("Delete Author", &content)
}
