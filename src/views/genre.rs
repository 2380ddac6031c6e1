use super::{delete_form, error_list, input, layout, submit};
use crate::model::{Book, Genre};
use crate::service::{FieldErrors, GenreDetail, GenreForm};

fn book_summaries(books: &[Book]) -> String {
    let items: String = books
        .iter()
        .map(|b| format!("<dt><a href=\"{}\">{}</a></dt><dd>{}</dd>", b.url(), b.title, b.summary))
        .collect();
    format!("<dl>{}</dl>", items)
}

pub fn list(genres: &[Genre]) -> String {
    let content = if genres.is_empty() {
        "<p>There are no genres.</p>".to_string()
    } else {
        let items: String = genres
            .iter()
            .map(|g| format!("<li><a href=\"{}\">{}</a></li>", g.url(), g.name))
            .collect();
        format!("<ul>{}</ul>", items)
    };
    layout("Genre List", &content)
}

pub fn detail(detail: &GenreDetail) -> String {
    let mut content = String::from("<h2>Books</h2>");
    if detail.books.is_empty() {
        content.push_str("<p>This genre has no books.</p>");
    } else {
        content.push_str(&book_summaries(&detail.books));
    }
    layout(&format!("Genre: {}", detail.genre.name), &content)
}

pub fn form(title: &str, form: &GenreForm, errors: &FieldErrors) -> String {
    let content = format!(
        "<form method=\"POST\" action=\"\">{}{}</form>{}",
        input("Genre", "name", "text", &form.name, true),
        submit(),
        error_list(errors)
    );
    layout(title, &content)
}

pub fn delete(genre: &Genre, books: &[Book]) -> String {
    let mut content = format!("<h2>{}</h2>", genre.name);
    if books.is_empty() {
        content.push_str(&delete_form("Do you really want to delete this Genre?"));
    } else {
        content.push_str("<p><strong>Delete the following books before attempting to delete this genre.</strong></p>");
        content.push_str(&book_summaries(books));
    }
    layout("Delete Genre", &content)
}
