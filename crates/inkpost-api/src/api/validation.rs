// Input validation gate
//
// A Validator accumulates every failing rule instead of stopping at the
// first one, so a client sees all problems with a request at once. Errors
// keep the order in which rules were declared, and each failing rule
// contributes exactly one entry.

use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

use super::error::{ApiError, FieldError};

fn username_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap())
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

/// Trim a string input, treating whitespace-only values as absent
pub fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Normalize an email: trimmed and lowercased
pub fn normalize_email(value: Option<&str>) -> Option<String> {
    normalize(value).map(|s| s.to_lowercase())
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Require a field to be present, returning it for further rules.
    /// A missing field contributes one error and skips the rest of its rules.
    pub fn require<'a>(&mut self, field: &str, value: Option<&'a str>) -> Option<&'a str> {
        match value {
            Some(v) if !v.trim().is_empty() => Some(v),
            _ => {
                self.fail(field, format!("{} is required", label(field)));
                None
            }
        }
    }

    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min || len > max {
            self.fail(
                field,
                format!(
                    "{} must be between {} and {} characters",
                    label(field),
                    min,
                    max
                ),
            );
        }
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.fail(
                field,
                format!(
                    "{} must be at least {} characters long",
                    label(field),
                    min
                ),
            );
        }
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.fail(
                field,
                format!("{} cannot exceed {} characters", label(field), max),
            );
        }
    }

    pub fn username(&mut self, field: &str, value: &str) {
        if !username_re().is_match(value) {
            self.fail(
                field,
                format!(
                    "{} can only contain letters, numbers, underscores and hyphens",
                    label(field)
                ),
            );
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !email_re().is_match(value) {
            self.fail(field, "Please provide a valid email");
        }
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) {
        if !allowed.contains(&value) {
            self.fail(
                field,
                format!("{} must be one of: {}", label(field), allowed.join(", ")),
            );
        }
    }

    /// Validate that the value parses as a UUID, returning it on success
    pub fn uuid(&mut self, field: &str, value: &str) -> Option<Uuid> {
        match Uuid::parse_str(value) {
            Ok(id) => Some(id),
            Err(_) => {
                self.fail(field, format!("{} must be a valid id", label(field)));
                None
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Terminate the gate: non-empty error list rejects the request
    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(count = self.errors.len(), "validation failed");
            Err(ApiError::Validation(self.errors))
        }
    }
}

/// Render a camelCase wire field name as words: "newPassword" -> "New password"
fn label(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for (i, c) in field.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_failures_accumulate_in_declaration_order() {
        // Registration request with three bad fields must yield exactly
        // three errors, ordered as declared
        let mut v = Validator::new();
        if let Some(username) = v.require("username", Some("ab")) {
            v.length("username", username, 3, 30);
            v.username("username", username);
        }
        if let Some(email) = v.require("email", Some("bad")) {
            v.email("email", email);
        }
        if let Some(password) = v.require("password", Some("123")) {
            v.min_len("password", password, 6);
        }

        let err = v.finish().unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert_eq!(errors.len(), 3);
                assert_eq!(errors[0].field, "username");
                assert_eq!(errors[1].field, "email");
                assert_eq!(errors[2].field, "password");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_contributes_one_error_and_skips_rules() {
        let mut v = Validator::new();
        if let Some(username) = v.require("username", None) {
            v.length("username", username, 3, 30);
            v.username("username", username);
        }

        let err = v.finish().unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].message, "Username is required");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        let mut v = Validator::new();
        if let Some(username) = v.require("username", Some("alice_99")) {
            v.length("username", username, 3, 30);
            v.username("username", username);
        }
        if let Some(email) = v.require("email", Some("alice@example.com")) {
            v.email("email", email);
        }
        assert!(v.is_ok());
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_one_of() {
        let mut v = Validator::new();
        v.one_of("status", "published", &["draft", "published", "archived"]);
        assert!(v.is_ok());

        v.one_of("status", "deleted", &["draft", "published", "archived"]);
        assert!(!v.is_ok());
    }

    #[test]
    fn test_uuid_rule() {
        let mut v = Validator::new();
        assert!(v
            .uuid("category", "00000000-0000-0000-0000-000000000000")
            .is_some());
        assert!(v.uuid("category", "not-a-uuid").is_none());
        assert!(!v.is_ok());
    }

    #[test]
    fn test_label_splits_camel_case() {
        let mut v = Validator::new();
        v.require("newPassword", None);
        let err = v.finish().unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert_eq!(errors[0].message, "New password is required");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Some("  hi  ")), Some("hi".to_string()));
        assert_eq!(normalize(Some("   ")), None);
        assert_eq!(normalize(None), None);
        assert_eq!(
            normalize_email(Some(" Alice@Example.COM ")),
            Some("alice@example.com".to_string())
        );
    }
}
