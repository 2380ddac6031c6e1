use super::{format_display_date, require};
use crate::error::StoreError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Circulation status of a physical copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BookStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookStatus {
    pub const ALL: [BookStatus; 4] = [
        BookStatus::Available,
        BookStatus::Maintenance,
        BookStatus::Loaned,
        BookStatus::Reserved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Maintenance => "Maintenance",
            BookStatus::Loaned => "Loaned",
            BookStatus::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown book status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for BookStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A physical copy of a [`super::Book`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookInstance {
    pub id: Uuid,
    pub book: Uuid,
    pub imprint: String,
    pub status: BookStatus,
    pub due_back: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookInstanceRecord {
    pub book: Uuid,
    pub imprint: String,
    pub status: BookStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookInstanceRecord {
    pub fn check_required(&self) -> Result<(), StoreError> {
        require("imprint", &self.imprint)
    }

    pub fn with_id(self, id: Uuid) -> BookInstance {
        BookInstance {
            id,
            book: self.book,
            imprint: self.imprint,
            status: self.status,
            due_back: self.due_back,
        }
    }
}

impl BookInstance {
    pub fn url(&self) -> String {
        format!("/catalog/bookinstance/{}", self.id)
    }

    pub fn due_back_formatted(&self) -> String {
        self.due_back.map(format_display_date).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_maintenance() {
        assert_eq!(BookStatus::default(), BookStatus::Maintenance);
    }

    #[test]
    fn status_parses_exact_names_only() {
        assert_eq!("Loaned".parse::<BookStatus>(), Ok(BookStatus::Loaned));
        assert_eq!(
            "loaned".parse::<BookStatus>(),
            Err(UnknownStatus("loaned".into()))
        );
    }

    #[test]
    fn due_back_formatting() {
        let copy = BookInstanceRecord {
            book: Uuid::new_v4(),
            imprint: "Gollancz, 2011".into(),
            status: BookStatus::Loaned,
            due_back: NaiveDate::from_ymd_opt(2024, 6, 5),
        }
        .with_id(Uuid::new_v4());
        assert_eq!(copy.due_back_formatted(), "Jun 5, 2024");
        assert!(copy.url().starts_with("/catalog/bookinstance/"));
    }
}
