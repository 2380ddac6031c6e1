use super::require;
use crate::error::StoreError;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenreRecord {
    pub name: String,
}

impl GenreRecord {
    pub fn check_required(&self) -> Result<(), StoreError> {
        require("name", &self.name)
    }

    pub fn with_id(self, id: Uuid) -> Genre {
        Genre { id, name: self.name }
    }
}

impl Genre {
    pub fn url(&self) -> String {
        format!("/catalog/genre/{}", self.id)
    }

    /// Genre names are unique under case-insensitive comparison.
    pub fn same_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}
