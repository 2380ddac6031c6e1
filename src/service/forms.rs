//! Typed form per entity. Each form keeps the sanitized values as entered (for
//! re-rendering) and validates into the matching store record.

use crate::extractors::FormFields;
use crate::model::{
    Author, AuthorRecord, Book, BookInstance, BookInstanceRecord, BookRecord, BookStatus, Genre,
    GenreRecord,
};
use crate::service::validation::{Check, FieldErrors};
use uuid::Uuid;

/// A submission that failed validation: the values to show again plus every violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejected<F> {
    pub form: F,
    pub errors: FieldErrors,
}

fn finish<F, R>(form: F, errors: FieldErrors, record: impl FnOnce(&F) -> R) -> Result<R, Rejected<F>> {
    if errors.is_empty() {
        Ok(record(&form))
    } else {
        Err(Rejected { form, errors })
    }
}

fn iso(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorForm {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: String,
    pub date_of_death: String,
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        AuthorForm {
            first_name: author.first_name.clone(),
            family_name: author.family_name.clone(),
            date_of_birth: iso(author.date_of_birth),
            date_of_death: iso(author.date_of_death),
        }
    }
}

impl AuthorForm {
    pub fn parse(fields: &FormFields) -> Result<AuthorRecord, Rejected<AuthorForm>> {
        let mut errors = FieldErrors::new();
        let first_name = Check::new("first_name", fields.get("first_name"))
            .trim()
            .min_length(1, "First name is required.")
            .escape()
            .alphanumeric("First name must be alphanumeric.")
            .finish(&mut errors);
        let family_name = Check::new("family_name", fields.get("family_name"))
            .trim()
            .min_length(1, "Family name is required.")
            .escape()
            .alphanumeric("Family name must be alphanumeric.")
            .finish(&mut errors);
        let (date_of_birth, birth) = Check::new("date_of_birth", fields.get("date_of_birth"))
            .trim()
            .optional()
            .escape()
            .date("Invalid date of birth.", &mut errors);
        let (date_of_death, death) = Check::new("date_of_death", fields.get("date_of_death"))
            .trim()
            .optional()
            .escape()
            .date("Invalid date of death.", &mut errors);
        if let (Some(b), Some(d)) = (birth, death) {
            if d < b {
                errors.push(
                    "date_of_death",
                    "Date of death must not be before date of birth.",
                );
            }
        }

        let form = AuthorForm {
            first_name,
            family_name,
            date_of_birth,
            date_of_death,
        };
        finish(form, errors, |f| AuthorRecord {
            first_name: f.first_name.clone(),
            family_name: f.family_name.clone(),
            date_of_birth: birth,
            date_of_death: death,
        })
    }
}

pub const GENRE_NAME_MESSAGE: &str = "Genre name requires at least 3 characters";
pub const GENRE_TAKEN_MESSAGE: &str = "A genre with this name already exists.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenreForm {
    pub name: String,
}

impl From<&Genre> for GenreForm {
    fn from(genre: &Genre) -> Self {
        GenreForm {
            name: genre.name.clone(),
        }
    }
}

impl GenreForm {
    pub fn parse(fields: &FormFields) -> Result<GenreRecord, Rejected<GenreForm>> {
        let mut errors = FieldErrors::new();
        let name = Check::new("name", fields.get("name"))
            .trim()
            .min_length(3, GENRE_NAME_MESSAGE)
            .escape()
            .finish(&mut errors);
        finish(GenreForm { name }, errors, |f| GenreRecord {
            name: f.name.clone(),
        })
    }

    /// Re-render after the store reported a name collision.
    pub fn name_taken(record: GenreRecord) -> Rejected<GenreForm> {
        let mut errors = FieldErrors::new();
        errors.push("name", GENRE_TAKEN_MESSAGE);
        Rejected {
            form: GenreForm { name: record.name },
            errors,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<String>,
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        BookForm {
            title: book.title.clone(),
            author: book.author.to_string(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: book.genre.iter().map(Uuid::to_string).collect(),
        }
    }
}

impl BookForm {
    /// Validate against the authors and genres that currently exist.
    pub fn parse(
        fields: &FormFields,
        authors: &[Author],
        genres: &[Genre],
    ) -> Result<BookRecord, Rejected<BookForm>> {
        let mut errors = FieldErrors::new();
        let title = Check::new("title", fields.get("title"))
            .trim()
            .min_length(1, "Title required")
            .escape()
            .finish(&mut errors);
        let (author, author_id) = Check::new("author", fields.get("author"))
            .trim()
            .min_length(1, "Author required")
            .escape()
            .uuid("Selected author does not exist.", &mut errors);
        let author_id = author_id.filter(|id| {
            let known = authors.iter().any(|a| a.id == *id);
            if !known {
                errors.push("author", "Selected author does not exist.");
            }
            known
        });
        let summary = Check::new("summary", fields.get("summary"))
            .trim()
            .min_length(1, "Summary required")
            .escape()
            .finish(&mut errors);
        let isbn = Check::new("isbn", fields.get("isbn"))
            .trim()
            .min_length(1, "ISBN required")
            .escape()
            .finish(&mut errors);

        let mut genre = Vec::new();
        let mut genre_ids: Vec<Uuid> = Vec::new();
        let mut invalid_genre = false;
        for raw in fields.get_all("genre") {
            let mut ignored = FieldErrors::new();
            let (value, id) = Check::new("genre", Some(raw))
                .trim()
                .escape()
                .uuid("Invalid genre selection.", &mut ignored);
            match id.filter(|id| genres.iter().any(|g| g.id == *id)) {
                Some(id) if !genre_ids.contains(&id) => genre_ids.push(id),
                Some(_) => {}
                None => invalid_genre = true,
            }
            genre.push(value);
        }
        if invalid_genre {
            errors.push("genre", "Invalid genre selection.");
        }

        let form = BookForm {
            title,
            author,
            summary,
            isbn,
            genre,
        };
        match author_id {
            Some(author_id) if errors.is_empty() => Ok(BookRecord {
                title: form.title,
                author: author_id,
                summary: form.summary,
                isbn: form.isbn,
                genre: genre_ids,
            }),
            _ => Err(Rejected { form, errors }),
        }
    }

    pub fn is_genre_selected(&self, genre: &Genre) -> bool {
        let id = genre.id.to_string();
        self.genre.iter().any(|g| *g == id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookInstanceForm {
    pub book: String,
    pub imprint: String,
    pub status: String,
    pub due_back: String,
}

impl From<&BookInstance> for BookInstanceForm {
    fn from(copy: &BookInstance) -> Self {
        BookInstanceForm {
            book: copy.book.to_string(),
            imprint: copy.imprint.clone(),
            status: copy.status.as_str().to_string(),
            due_back: iso(copy.due_back),
        }
    }
}

impl BookInstanceForm {
    /// Validate against the books that currently exist. A missing status
    /// defaults to [`BookStatus::Maintenance`].
    pub fn parse(
        fields: &FormFields,
        books: &[Book],
    ) -> Result<BookInstanceRecord, Rejected<BookInstanceForm>> {
        let mut errors = FieldErrors::new();
        let (book, book_id) = Check::new("book", fields.get("book"))
            .trim()
            .min_length(1, "Selection of a book is required.")
            .escape()
            .uuid("Selected book does not exist.", &mut errors);
        let book_id = book_id.filter(|id| {
            let known = books.iter().any(|b| b.id == *id);
            if !known {
                errors.push("book", "Selected book does not exist.");
            }
            known
        });
        let imprint = Check::new("imprint", fields.get("imprint"))
            .trim()
            .min_length(1, "Imprint is required")
            .escape()
            .finish(&mut errors);
        let status = Check::new("status", fields.get("status"))
            .trim()
            .escape()
            .finish(&mut errors);
        let parsed_status = if status.is_empty() {
            Some(BookStatus::default())
        } else {
            let parsed = status.parse::<BookStatus>().ok();
            if parsed.is_none() {
                errors.push("status", "Invalid status.");
            }
            parsed
        };
        let (due_back, due_back_date) = Check::new("due_back", fields.get("due_back"))
            .trim()
            .optional()
            .escape()
            .date("Invalid due back date.", &mut errors);

        let form = BookInstanceForm {
            book,
            imprint,
            status,
            due_back,
        };
        match (book_id, parsed_status) {
            (Some(book), Some(status)) if errors.is_empty() => Ok(BookInstanceRecord {
                book,
                imprint: form.imprint,
                status,
                due_back: due_back_date,
            }),
            _ => Err(Rejected { form, errors }),
        }
    }

    /// Status to preselect; an empty entry shows the default.
    pub fn selected_status(&self) -> BookStatus {
        self.status.parse().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AuthorRecord;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        pairs.iter().copied().collect()
    }

    fn author() -> Author {
        AuthorRecord {
            first_name: "Iain".into(),
            family_name: "Banks".into(),
            date_of_birth: None,
            date_of_death: None,
        }
        .with_id(Uuid::new_v4())
    }

    fn genre(name: &str) -> Genre {
        GenreRecord { name: name.into() }.with_id(Uuid::new_v4())
    }

    #[test]
    fn author_empty_first_name_rejected() {
        let rejected = AuthorForm::parse(&fields(&[
            ("first_name", ""),
            ("family_name", "Banks"),
        ]))
        .unwrap_err();
        assert!(rejected.errors.contains("First name is required."));
        assert_eq!(rejected.form.family_name, "Banks");
        assert!(rejected.errors.for_field("family_name").next().is_none());
    }

    #[test]
    fn author_optional_dates() {
        let record = AuthorForm::parse(&fields(&[
            ("first_name", " Iain "),
            ("family_name", "Banks"),
            ("date_of_birth", "1954-02-16"),
            ("date_of_death", ""),
        ]))
        .unwrap();
        assert_eq!(record.first_name, "Iain");
        assert_eq!(record.date_of_birth, chrono::NaiveDate::from_ymd_opt(1954, 2, 16));
        assert_eq!(record.date_of_death, None);
    }

    #[test]
    fn author_death_before_birth_rejected() {
        let rejected = AuthorForm::parse(&fields(&[
            ("first_name", "Iain"),
            ("family_name", "Banks"),
            ("date_of_birth", "2013-06-09"),
            ("date_of_death", "1954-02-16"),
        ]))
        .unwrap_err();
        assert!(rejected
            .errors
            .contains("Date of death must not be before date of birth."));
    }

    #[test]
    fn author_collects_all_violations() {
        let rejected = AuthorForm::parse(&fields(&[
            ("first_name", "Ia!n"),
            ("family_name", ""),
            ("date_of_birth", "yesterday"),
        ]))
        .unwrap_err();
        assert!(rejected.errors.contains("First name must be alphanumeric."));
        assert!(rejected.errors.contains("Family name is required."));
        assert!(rejected.errors.contains("Invalid date of birth."));
    }

    #[test]
    fn genre_name_sanitized_and_length_checked() {
        let record = GenreForm::parse(&fields(&[("name", " Sci & Fi ")])).unwrap();
        assert_eq!(record.name, "Sci &amp; Fi");
        let rejected = GenreForm::parse(&fields(&[("name", "ab")])).unwrap_err();
        assert!(rejected.errors.contains(GENRE_NAME_MESSAGE));
        assert_eq!(rejected.form.name, "ab");
    }

    #[test]
    fn book_single_genre_becomes_sequence() {
        let author = author();
        let fantasy = genre("Fantasy");
        let author_id = author.id.to_string();
        let genre_id = fantasy.id.to_string();
        let record = BookForm::parse(
            &fields(&[
                ("title", "Use of Weapons"),
                ("author", author_id.as_str()),
                ("summary", "Zakalwe"),
                ("isbn", "9781857231359"),
                ("genre", genre_id.as_str()),
            ]),
            &[author],
            &[fantasy.clone()],
        )
        .unwrap();
        assert_eq!(record.genre, vec![fantasy.id]);
    }

    #[test]
    fn book_unknown_references_rejected() {
        let author_id = Uuid::new_v4().to_string();
        let rejected = BookForm::parse(
            &fields(&[
                ("title", "Use of Weapons"),
                ("author", author_id.as_str()),
                ("summary", "Zakalwe"),
                ("isbn", "9781857231359"),
                ("genre", "not-an-id"),
            ]),
            &[],
            &[],
        )
        .unwrap_err();
        assert!(rejected.errors.contains("Selected author does not exist."));
        assert!(rejected.errors.contains("Invalid genre selection."));
        assert_eq!(rejected.form.genre, vec!["not-an-id".to_string()]);
    }

    #[test]
    fn book_missing_fields_all_reported() {
        let rejected = BookForm::parse(&fields(&[]), &[], &[]).unwrap_err();
        for message in ["Title required", "Author required", "Summary required", "ISBN required"] {
            assert!(rejected.errors.contains(message), "missing {}", message);
        }
        assert_eq!(rejected.errors.len(), 4);
    }

    #[test]
    fn copy_status_defaults_and_validates() {
        let author = author();
        let book = BookRecord {
            title: "Excession".into(),
            author: author.id,
            summary: "s".into(),
            isbn: "i".into(),
            genre: vec![],
        }
        .with_id(Uuid::new_v4());
        let book_id = book.id.to_string();
        let books = [book];

        let record = BookInstanceForm::parse(
            &fields(&[("book", book_id.as_str()), ("imprint", "Orbit 1996")]),
            &books,
        )
        .unwrap();
        assert_eq!(record.status, BookStatus::Maintenance);
        assert_eq!(record.due_back, None);

        let rejected = BookInstanceForm::parse(
            &fields(&[
                ("book", book_id.as_str()),
                ("imprint", "Orbit 1996"),
                ("status", "Lost"),
                ("due_back", "soon"),
            ]),
            &books,
        )
        .unwrap_err();
        assert!(rejected.errors.contains("Invalid status."));
        assert!(rejected.errors.contains("Invalid due back date."));
        assert_eq!(rejected.form.selected_status(), BookStatus::Maintenance);
    }
}
