//! Reusable field validators for eventline records
//!
//! Each validator returns the normalized value on success so callers can build
//! the canonical record directly from the results.

use regex::Regex;
use std::sync::OnceLock;

use super::error::{ValidationError, ValidationErrorKind, ValidationResult};

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Get or initialize the email shape pattern (`local@domain.tld`)
fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex pattern")
    })
}

/// Validate a required text field is not blank, returning it trimmed
pub fn validate_required(value: &str, field_name: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::missing(field_name))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Validate a required list of text items
///
/// The list must be non-empty and every item must be non-blank. Items are
/// returned trimmed, in their original order.
pub fn validate_list(items: &[String], field_name: &str) -> ValidationResult<Vec<String>> {
    if items.is_empty() {
        return Err(ValidationError::with_context(
            ValidationErrorKind::MissingField,
            field_name,
            "At least one item is required",
        ));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let trimmed = item.trim();
            if trimmed.is_empty() {
                Err(ValidationError::with_context(
                    ValidationErrorKind::EmptyListItem,
                    field_name,
                    format!("Item at position {} is blank", index),
                ))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

/// Validate a tag list: same rules as [`validate_list`], lower-cased
pub fn validate_tags(tags: &[String], field_name: &str) -> ValidationResult<Vec<String>> {
    validate_list(tags, field_name)
        .map(|tags| tags.into_iter().map(|tag| tag.to_lowercase()).collect())
}

/// Validate and normalize an email address
///
/// The address is trimmed and lower-cased before the shape check.
pub fn validate_email(email: &str, field_name: &str) -> ValidationResult<String> {
    let normalized = validate_required(email, field_name)?.to_lowercase();

    if email_regex().is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(ValidationError::with_context(
            ValidationErrorKind::InvalidFormat,
            field_name,
            format!("Invalid email address: {}", normalized),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("value", "test").unwrap(), "value");
        assert_eq!(validate_required(" value ", "test").unwrap(), "value");

        let err = validate_required("   ", "venue").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingField);
        assert_eq!(err.field, "venue");
        assert!(validate_required("", "test").is_err());
    }

    #[test]
    fn test_validate_list_trims_items() {
        let items = strings(&["  Opening ", "Keynote", "Q&A  "]);
        assert_eq!(
            validate_list(&items, "agenda").unwrap(),
            strings(&["Opening", "Keynote", "Q&A"])
        );
    }

    #[test]
    fn test_validate_list_rejects_empty_list() {
        let err = validate_list(&[], "agenda").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingField);
        assert_eq!(err.field, "agenda");
    }

    #[test]
    fn test_validate_list_rejects_blank_item() {
        let err = validate_list(&strings(&["  ", "Keynote"]), "agenda").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::EmptyListItem);
        assert_eq!(err.context.as_deref(), Some("Item at position 0 is blank"));
    }

    #[test]
    fn test_validate_tags_lowercases() {
        let tags = strings(&[" Rust ", "WEB3", "ai"]);
        assert_eq!(
            validate_tags(&tags, "tags").unwrap(),
            strings(&["rust", "web3", "ai"])
        );
        assert!(validate_tags(&strings(&["ok", ""]), "tags").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email("  USER@Example.COM  ", "email").unwrap(),
            "user@example.com"
        );
        assert_eq!(
            validate_email("first.last@sub.example.org", "email").unwrap(),
            "first.last@sub.example.org"
        );
    }

    #[test]
    fn test_validate_email_invalid() {
        let invalid = [
            "plainaddress",
            "no-at.example.com",
            "user@nodot",
            "us er@example.com",
            "@example.com",
            "user@.com@x",
        ];

        for email in invalid {
            let err = validate_email(email, "email").unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::InvalidFormat, "{}", email);
        }

        let err = validate_email("   ", "email").unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingField);
    }
}
