// Contact requests left through the landing page form.
mod repository;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use self::repository::{ContactRepository, SqliteContactRepository};

const COUNTRY_CODE: &str = "996";
const LOCAL_DIGITS: usize = 9;
const MAX_NAME_CHARS: usize = 200;
const MAX_COMMENT_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    New,
    Contacted,
    Completed,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactStatus {
    type Err = ContactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "completed" => Ok(Self::Completed),
            other => Err(ContactError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Please fill in the required fields")]
    MissingFields,

    #[error("Enter a valid Kyrgyz number (+996 XXX XX-XX-XX)")]
    InvalidPhone,

    #[error("{0} is too long")]
    TooLong(&'static str),

    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Submission not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),
}

/// A validated contact request, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub name: String,
    pub phone: String,
    pub comment: String,
}

impl NewSubmission {
    pub fn validate(name: &str, phone: &str, comment: &str) -> Result<Self, ContactError> {
        let name = name.trim();
        let comment = comment.trim();
        if name.is_empty() || phone.trim().is_empty() {
            return Err(ContactError::MissingFields);
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(ContactError::TooLong("Name"));
        }
        if comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(ContactError::TooLong("Comment"));
        }

        let digits = normalize_phone(phone)?;
        Ok(Self {
            name: name.to_string(),
            phone: format_kyrgyz_phone(&digits),
            comment: comment.to_string(),
        })
    }
}

/// The nine local digits of a Kyrgyz number, with any `996` or trunk `0`
/// prefix removed.
pub fn normalize_phone(input: &str) -> Result<String, ContactError> {
    let digits = local_digits(input);
    if digits.len() != LOCAL_DIGITS {
        return Err(ContactError::InvalidPhone);
    }
    Ok(digits)
}

/// Progressive `+996 (XXX) XX-XX-XX` formatting; partial input yields a
/// partial number, extra digits are dropped.
pub fn format_kyrgyz_phone(input: &str) -> String {
    let mut digits = local_digits(input);
    digits.truncate(LOCAL_DIGITS);

    let mut formatted = format!("+{}", COUNTRY_CODE);
    let len = digits.len();
    if len > 0 {
        formatted.push_str(" (");
        formatted.push_str(&digits[..len.min(3)]);
    }
    if len >= 3 {
        formatted.push(')');
    }
    if len > 3 {
        formatted.push(' ');
        formatted.push_str(&digits[3..len.min(5)]);
    }
    if len > 5 {
        formatted.push('-');
        formatted.push_str(&digits[5..len.min(7)]);
    }
    if len > 7 {
        formatted.push('-');
        formatted.push_str(&digits[7..len]);
    }
    formatted
}

fn local_digits(input: &str) -> String {
    let all: String = input.chars().filter(char::is_ascii_digit).collect();
    let rest = all.strip_prefix(COUNTRY_CODE).unwrap_or(&all);
    let rest = rest.strip_prefix('0').unwrap_or(rest);
    rest.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_partial_numbers() {
        assert_eq!(format_kyrgyz_phone(""), "+996");
        assert_eq!(format_kyrgyz_phone("55"), "+996 (55");
        assert_eq!(format_kyrgyz_phone("555"), "+996 (555)");
        assert_eq!(format_kyrgyz_phone("5551"), "+996 (555) 1");
        assert_eq!(format_kyrgyz_phone("555123"), "+996 (555) 12-3");
        assert_eq!(format_kyrgyz_phone("555123456"), "+996 (555) 12-34-56");
    }

    #[test]
    fn strips_country_code_and_trunk_prefix() {
        assert_eq!(format_kyrgyz_phone("+996 555 123 456"), "+996 (555) 12-34-56");
        assert_eq!(format_kyrgyz_phone("0555123456"), "+996 (555) 12-34-56");
        assert_eq!(format_kyrgyz_phone("5551234567890"), "+996 (555) 12-34-56");
    }

    #[test]
    fn normalize_requires_nine_digits() {
        assert_eq!(normalize_phone("+996 (555) 12-34-56").unwrap(), "555123456");
        assert_eq!(normalize_phone("0 555 12 34 56").unwrap(), "555123456");
        assert!(normalize_phone("555 12 34").is_err());
        assert!(normalize_phone("+996 555 12 34 567").is_err());
        assert!(normalize_phone("phone").is_err());
    }

    #[test]
    fn validate_trims_and_formats() {
        let submission =
            NewSubmission::validate("  Nurlan ", "0555123456", "  kitchen, 3m  ").unwrap();
        assert_eq!(submission.name, "Nurlan");
        assert_eq!(submission.phone, "+996 (555) 12-34-56");
        assert_eq!(submission.comment, "kitchen, 3m");
    }

    #[test]
    fn validate_rejects_missing_and_oversized_fields() {
        assert!(matches!(
            NewSubmission::validate("", "0555123456", ""),
            Err(ContactError::MissingFields)
        ));
        assert!(matches!(
            NewSubmission::validate("Nurlan", "  ", ""),
            Err(ContactError::MissingFields)
        ));
        assert!(matches!(
            NewSubmission::validate("Nurlan", "12345", ""),
            Err(ContactError::InvalidPhone)
        ));
        assert!(matches!(
            NewSubmission::validate("Nurlan", "0555123456", &"x".repeat(2001)),
            Err(ContactError::TooLong("Comment"))
        ));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ContactStatus::New,
            ContactStatus::Contacted,
            ContactStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<ContactStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ContactStatus>().is_err());
    }
}
