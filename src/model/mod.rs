//! Catalog entities. Each stored entity has an id assigned at creation; the
//! matching `*Record` type is the write payload (everything but the id).

mod author;
mod book;
mod book_instance;
mod genre;

pub use author::{Author, AuthorRecord};
pub use book::{Book, BookRecord};
pub use book_instance::{BookInstance, BookInstanceRecord, BookStatus, UnknownStatus};
pub use genre::{Genre, GenreRecord};

use crate::error::StoreError;
use chrono::NaiveDate;

/// Date format used on rendered pages, e.g. "Jun 5, 1965".
pub const DISPLAY_DATE: &str = "%b %-d, %Y";

pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE).to_string()
}

/// Store-side required-field check, applied again after form validation.
fn require(field: &'static str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(field));
    }
    Ok(())
}
