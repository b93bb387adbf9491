//! Declarative input checks. Each rule records a [`FieldViolation`] instead
//! of failing fast, so callers get every problem with a request at once.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use domains::{AppError, FieldViolation, Result};
use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<FieldViolation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn reject(&mut self, field: &str, message: &str) {
        self.violations.push(FieldViolation::new(field, message));
    }

    /// Non-blank value, returned trimmed.
    pub fn required(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<String> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Some(v.to_string()),
            None => {
                self.reject(field, message);
                None
            }
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>, message: &str) -> Option<String> {
        match value.map(str::trim).filter(|v| EMAIL.is_match(v)) {
            Some(v) => Some(v.to_lowercase()),
            None => {
                self.reject(field, message);
                None
            }
        }
    }

    pub fn min_len(&mut self, field: &str, value: Option<&str>, min: usize, message: &str) -> Option<String> {
        match value.filter(|v| v.chars().count() >= min) {
            Some(v) => Some(v.to_string()),
            None => {
                self.reject(field, message);
                None
            }
        }
    }

    /// A parsed list that must keep at least one item.
    pub fn non_empty<T>(&mut self, field: &str, items: Option<Vec<T>>, message: &str) -> Option<Vec<T>> {
        match items {
            Some(items) if items.is_empty() => {
                self.reject(field, message);
                None
            }
            other => other,
        }
    }

    /// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp. Blank input is only a
    /// violation when `required` is set.
    pub fn date(&mut self, field: &str, value: Option<&str>, required: bool, message: &str) -> Option<NaiveDate> {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            if required {
                self.reject(field, message);
            }
            return None;
        };
        let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()));
        if parsed.is_none() {
            self.reject(field, message);
        }
        parsed
    }

    /// `to` must not precede `from` when both are present.
    pub fn date_order(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>, field: &str, message: &str) {
        if let (Some(from), Some(to)) = (from, to) {
            if to < from {
                self.reject(field, message);
            }
        }
    }

    pub fn finish(self) -> Result<()> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.violations))
        }
    }
}

/// Trims an optional field and drops it when blank.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_violation() {
        let mut v = Validator::new();
        v.required("name", Some("   "), "Name is required");
        v.email("email", Some("nope"), "Please include a valid email");
        v.min_len("password", Some("12345"), 6, "Password too short");
        match v.finish() {
            Err(AppError::Validation(violations)) => {
                let fields: Vec<_> = violations.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email", "password"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn email_is_normalised() {
        let mut v = Validator::new();
        assert_eq!(
            v.email("email", Some(" Ada@Example.COM "), "bad").as_deref(),
            Some("ada@example.com")
        );
        assert!(v.finish().is_ok());
    }

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        let mut v = Validator::new();
        let plain = v.date("from", Some("2020-01-01"), true, "bad");
        let stamped = v.date("from", Some("2020-01-01T10:00:00Z"), true, "bad");
        assert_eq!(plain, stamped);
        assert_eq!(v.date("to", None, false, "bad"), None);
        assert!(v.finish().is_ok());
    }

    #[test]
    fn reversed_date_range_is_rejected() {
        let mut v = Validator::new();
        let from = NaiveDate::from_ymd_opt(2021, 1, 1);
        let to = NaiveDate::from_ymd_opt(2020, 1, 1);
        v.date_order(from, to, "to", "End date must follow start date");
        assert!(v.finish().is_err());
    }

    #[test]
    fn empty_list_is_rejected() {
        let mut v = Validator::new();
        assert_eq!(v.non_empty("skills", Some(vec!["go"]), "m"), Some(vec!["go"]));
        assert_eq!(v.non_empty::<String>("skills", None, "m"), None);
        assert_eq!(v.non_empty::<String>("skills", Some(vec![]), "Skills are required"), None);
        match v.finish() {
            Err(AppError::Validation(list)) => {
                assert_eq!(list, vec![FieldViolation::new("skills", "Skills are required")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
