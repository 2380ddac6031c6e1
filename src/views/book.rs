use super::{delete_form, error_list, input, layout, select, status_badge, submit, textarea};
use crate::model::{Book, BookInstance, BookStatus};
use crate::service::{BookChoices, BookDetail, BookForm, BookListEntry, FieldErrors};

pub fn list(entries: &[BookListEntry]) -> String {
    let content = if entries.is_empty() {
        "<p>There are no books.</p>".to_string()
    } else {
        let items: String = entries
            .iter()
            .map(|entry| {
                let by = entry
                    .author
                    .as_ref()
                    .map(|a| format!(" ({})", a.name()))
                    .unwrap_or_default();
                format!(
                    "<li><a href=\"{}\">{}</a>{}</li>",
                    entry.book.url(),
                    entry.book.title,
                    by
                )
            })
            .collect();
        format!("<ul>{}</ul>", items)
    };
    layout("Book List", &content)
}

fn copy_summary(copy: &BookInstance) -> String {
    let mut out = format!("<hr><p>{}</p><p><strong>Imprint:</strong> {}</p>", status_badge(copy.status), copy.imprint);
    if copy.status != BookStatus::Available {
        out.push_str(&format!("<p><strong>Due back:</strong> {}</p>", copy.due_back_formatted()));
    }
    out.push_str(&format!(
        "<p><strong>Id:</strong> <a href=\"{}\">{}</a></p>",
        copy.url(),
        copy.id
    ));
    out
}

pub fn detail(detail: &BookDetail) -> String {
    let book = &detail.book;
    let author = detail
        .author
        .as_ref()
        .map(|a| format!("<a href=\"{}\">{}</a>", a.url(), a.name()))
        .unwrap_or_default();
    let genres: Vec<String> = detail
        .genres
        .iter()
        .map(|g| format!("<a href=\"{}\">{}</a>", g.url(), g.name))
        .collect();
    let mut content = format!(
        "<p><strong>Author:</strong> {}</p><p><strong>Summary:</strong> {}</p>\
         <p><strong>ISBN:</strong> {}</p><p><strong>Genre:</strong> {}</p><h2>Copies</h2>",
        author,
        book.summary,
        book.isbn,
        genres.join(", ")
    );
    if detail.copies.is_empty() {
        content.push_str("<p>There are no copies of this book in the library.</p>");
    } else {
        for copy in &detail.copies {
            content.push_str(&copy_summary(copy));
        }
    }
    layout(&format!("Title: {}", book.title), &content)
}

pub fn form(title: &str, form: &BookForm, choices: &BookChoices, errors: &FieldErrors) -> String {
    let authors = select(
        "Author",
        "author",
        Some("--Please select an author--"),
        choices.authors.iter().map(|a| (a.id.to_string(), a.name())),
        &form.author,
    );
    let genres: String = choices
        .genre_choices(|g| form.is_genre_selected(g))
        .iter()
        .map(|choice| {
            format!(
                "<div class=\"genre-choice\"><input type=\"checkbox\" name=\"genre\" id=\"{id}\" value=\"{id}\"{checked}>\
                 <label for=\"{id}\">{name}</label></div>",
                id = choice.genre.id,
                checked = if choice.checked { " checked" } else { "" },
                name = choice.genre.name
            )
        })
        .collect();
    let content = format!(
        "<form method=\"POST\" action=\"\">{}{}{}{}<div class=\"form-group\"><label>Genre:</label>{}</div>{}</form>{}",
        input("Title", "title", "text", &form.title, true),
        authors,
        textarea("Summary", "summary", &form.summary),
        input("ISBN", "isbn", "text", &form.isbn, true),
        genres,
        submit(),
        error_list(errors)
    );
    layout(title, &content)
}

pub fn delete(book: &Book, copies: &[BookInstance]) -> String {
    let mut content = format!("<h2>{}</h2>", book.title);
    if copies.is_empty() {
        content.push_str(&delete_form("Do you really want to delete this Book?"));
    } else {
        content.push_str("<p><strong>Delete the following copies before attempting to delete this book.</strong></p>");
        for copy in copies {
            content.push_str(&copy_summary(copy));
        }
    }
    layout("Delete Book", &content)
}
