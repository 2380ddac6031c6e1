use super::{format_display_date, require};
use crate::error::StoreError;
use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorRecord {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorRecord {
    pub fn check_required(&self) -> Result<(), StoreError> {
        require("first_name", &self.first_name)?;
        require("family_name", &self.family_name)
    }

    pub fn with_id(self, id: Uuid) -> Author {
        Author {
            id,
            first_name: self.first_name,
            family_name: self.family_name,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
        }
    }
}

impl Author {
    /// "family_name, first_name".
    pub fn name(&self) -> String {
        format!("{}, {}", self.family_name, self.first_name)
    }

    /// Birth and death dates joined by " - "; unknown ends are left blank,
    /// and an author with neither date has an empty lifespan.
    pub fn lifespan(&self) -> String {
        if self.date_of_birth.is_none() && self.date_of_death.is_none() {
            return String::new();
        }
        format!(
            "{} - {}",
            self.date_of_birth.map(format_display_date).unwrap_or_default(),
            self.date_of_death.map(format_display_date).unwrap_or_default()
        )
    }

    pub fn url(&self) -> String {
        format!("/catalog/author/{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(birth: Option<NaiveDate>, death: Option<NaiveDate>) -> Author {
        AuthorRecord {
            first_name: "Isaac".into(),
            family_name: "Asimov".into(),
            date_of_birth: birth,
            date_of_death: death,
        }
        .with_id(Uuid::new_v4())
    }

    #[test]
    fn name_is_family_then_first() {
        assert_eq!(author(None, None).name(), "Asimov, Isaac");
    }

    #[test]
    fn lifespan_handles_unknown_dates() {
        let birth = NaiveDate::from_ymd_opt(1920, 1, 2);
        let death = NaiveDate::from_ymd_opt(1992, 4, 6);
        assert_eq!(author(birth, death).lifespan(), "Jan 2, 1920 - Apr 6, 1992");
        assert_eq!(author(birth, None).lifespan(), "Jan 2, 1920 - ");
        assert_eq!(author(None, death).lifespan(), " - Apr 6, 1992");
        assert_eq!(author(None, None).lifespan(), "");
    }

    #[test]
    fn blank_names_fail_required_check() {
        let record = AuthorRecord {
            first_name: "  ".into(),
            family_name: "Asimov".into(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert!(matches!(
            record.check_required(),
            Err(StoreError::Validation("first_name"))
        ));
    }
}
