use super::require;
use crate::error::StoreError;
use uuid::Uuid;

/// A title. `author` and `genre` are references, resolved on read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: Uuid,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<Uuid>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookRecord {
    pub title: String,
    pub author: Uuid,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<Uuid>,
}

impl BookRecord {
    pub fn check_required(&self) -> Result<(), StoreError> {
        require("title", &self.title)?;
        require("summary", &self.summary)?;
        require("isbn", &self.isbn)
    }

    pub fn with_id(self, id: Uuid) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            summary: self.summary,
            isbn: self.isbn,
            genre: self.genre,
        }
    }
}

impl Book {
    pub fn url(&self) -> String {
        format!("/catalog/book/{}", self.id)
    }

    pub fn has_genre(&self, genre_id: Uuid) -> bool {
        self.genre.contains(&genre_id)
    }
}
