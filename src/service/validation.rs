//! Field validation for form input: trim, length and pattern checks, markup
//! escaping and type coercion, each failure recorded against its field.
//!
//! A [`Check`] runs every rule in its chain and records each failure; callers
//! run one chain per field and collect everything in a shared [`FieldErrors`].

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

static ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z]+$").expect("alphanumeric pattern compiles"));

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All violations found in one submission, in field order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn contains(&self, message: &str) -> bool {
        self.0.iter().any(|e| e.message == message)
    }
}

/// Escape markup-significant characters.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Accepts a calendar date (`2024-06-05`) or an RFC 3339 timestamp, whose date part is kept.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Validation chain for one form field.
#[derive(Debug)]
pub struct Check {
    field: &'static str,
    value: String,
    skip: bool,
    failures: Vec<String>,
}

impl Check {
    pub fn new(field: &'static str, raw: Option<&str>) -> Self {
        Check {
            field,
            value: raw.unwrap_or_default().to_string(),
            skip: false,
            failures: Vec::new(),
        }
    }

    pub fn trim(mut self) -> Self {
        let trimmed = self.value.trim();
        if trimmed.len() != self.value.len() {
            self.value = trimmed.to_string();
        }
        self
    }

    /// An empty value counts as absent: later rules are skipped.
    pub fn optional(mut self) -> Self {
        if self.value.is_empty() {
            self.skip = true;
        }
        self
    }

    pub fn min_length(self, min: usize, message: &str) -> Self {
        let ok = self.value.chars().count() >= min;
        self.rule(ok, message)
    }

    pub fn escape(mut self) -> Self {
        if !self.skip {
            self.value = escape(&self.value);
        }
        self
    }

    pub fn alphanumeric(self, message: &str) -> Self {
        let ok = ALPHANUMERIC.is_match(&self.value);
        self.rule(ok, message)
    }

    fn rule(mut self, ok: bool, message: &str) -> Self {
        if !self.skip && !ok {
            self.failures.push(message.to_string());
        }
        self
    }

    /// Record failures and return the sanitized value.
    pub fn finish(self, errors: &mut FieldErrors) -> String {
        for message in self.failures {
            errors.push(self.field, message);
        }
        self.value
    }

    /// Coerce to a date. `None` for a skipped optional field or a failed parse.
    pub fn date(self, message: &str, errors: &mut FieldErrors) -> (String, Option<NaiveDate>) {
        let skip = self.skip;
        let field = self.field;
        let value = self.finish(errors);
        if skip {
            return (value, None);
        }
        match parse_iso_date(&value) {
            Some(date) => (value, Some(date)),
            None => {
                errors.push(field, message);
                (value, None)
            }
        }
    }

    /// Coerce to an identifier. Skipped when earlier rules already failed.
    pub fn uuid(self, message: &str, errors: &mut FieldErrors) -> (String, Option<Uuid>) {
        let skip = self.skip || !self.failures.is_empty();
        let field = self.field;
        let value = self.finish(errors);
        if skip {
            return (value, None);
        }
        match Uuid::parse_str(&value) {
            Ok(id) => (value, Some(id)),
            Err(_) => {
                errors.push(field, message);
                (value, None)
            }
        }
    }
}
