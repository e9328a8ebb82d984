//! Submission data model and field validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 50;
pub const MESSAGE_MIN: usize = 10;
pub const MESSAGE_MAX: usize = 1000;

/// Dot-separated local part that may not end in `'`, then a dotted domain
/// with an alphabetic TLD.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z0-9_'+\-]+\.)*[A-Za-z0-9_'+\-]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
    )
    .expect("email pattern compiles")
});

/// Untrusted form fields as they arrived.
///
/// Fields hold raw JSON so type mismatches surface as field errors rather
/// than as a parse failure of the whole body. JSON `null` counts as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionInput {
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub message: Option<Value>,
    /// Honeypot; hidden from human visitors.
    pub website: Option<Value>,
}

impl SubmissionInput {
    pub fn new(name: &str, email: &str, message: &str) -> Self {
        Self {
            name: Some(Value::from(name)),
            email: Some(Value::from(email)),
            message: Some(Value::from(message)),
            website: None,
        }
    }

    pub fn with_website(mut self, website: &str) -> Self {
        self.website = Some(Value::from(website));
        self
    }

    /// Pick the known fields out of a parsed body. Unknown keys are dropped.
    pub fn from_json(body: Value) -> Result<Self, Vec<FieldError>> {
        match body {
            Value::Object(mut map) => {
                let mut take = |key: &str| map.remove(key).filter(|v| !v.is_null());
                Ok(Self {
                    name: take("name"),
                    email: take("email"),
                    message: take("message"),
                    website: take("website"),
                })
            }
            other => Err(vec![FieldError::root(format!(
                "Expected object, received {}",
                json_type(&other)
            ))]),
        }
    }
}

/// A submission that passed every field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(skip)]
    pub website: Option<String>,
}

/// One failing field, serialized as `{ "path": [...], "message": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: Vec<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            path: vec![field.to_string()],
            message: message.into(),
        }
    }

    fn root(message: String) -> Self {
        Self {
            path: Vec::new(),
            message,
        }
    }

    /// The top-level field this error belongs to; `None` for the body itself.
    pub fn field(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }
}

/// Check every field rule and collect all failures.
pub fn validate(input: &SubmissionInput) -> Result<ValidatedSubmission, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = required_string(input.name.as_ref(), "name", &mut errors).filter(|name| {
        check_length(name, "name", "Name", NAME_MIN, NAME_MAX, &mut errors)
    });

    let email = required_string(input.email.as_ref(), "email", &mut errors).filter(|email| {
        let valid = EMAIL_PATTERN.is_match(email);
        if !valid {
            errors.push(FieldError::new("email", "Please enter a valid email address"));
        }
        valid
    });

    let message = required_string(input.message.as_ref(), "message", &mut errors).filter(|message| {
        check_length(message, "message", "Message", MESSAGE_MIN, MESSAGE_MAX, &mut errors)
    });

    let website = match input.website.as_ref() {
        None => None,
        Some(Value::String(website)) => Some(website.clone()),
        Some(other) => {
            errors.push(type_error("website", other));
            None
        }
    };

    match (name, email, message) {
        (Some(name), Some(email), Some(message)) if errors.is_empty() => Ok(ValidatedSubmission {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            website,
        }),
        _ => Err(errors),
    }
}

fn required_string<'a>(
    value: Option<&'a Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    match value {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(other) => {
            errors.push(type_error(field, other));
            None
        }
        None => {
            errors.push(FieldError::new(field, "Required"));
            None
        }
    }
}

fn check_length(
    value: &str,
    field: &str,
    label: &str,
    min: usize,
    max: usize,
    errors: &mut Vec<FieldError>,
) -> bool {
    let len = value.chars().count();
    if len < min {
        errors.push(FieldError::new(
            field,
            format!("{} must be at least {} characters", label, min),
        ));
        false
    } else if len > max {
        errors.push(FieldError::new(
            field,
            format!("{} must be less than {} characters", label, max),
        ));
        false
    } else {
        true
    }
}

fn type_error(field: &str, value: &Value) -> FieldError {
    FieldError::new(
        field,
        format!("Expected string, received {}", json_type(value)),
    )
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().filter_map(FieldError::field).collect()
    }

    #[test]
    fn test_minimum_lengths_accepted() {
        let validated = validate(&SubmissionInput::new("Al", "a@b.co", "0123456789")).unwrap();
        assert_eq!(validated.name, "Al");
        assert_eq!(validated.email, "a@b.co");
        assert_eq!(validated.message, "0123456789");
        assert!(validated.website.is_none());
    }

    #[test]
    fn test_maximum_lengths_accepted() {
        let name = "n".repeat(NAME_MAX);
        let message = "m".repeat(MESSAGE_MAX);
        assert!(validate(&SubmissionInput::new(&name, "a@b.co", &message)).is_ok());
    }

    #[test]
    fn test_short_name_is_the_only_error() {
        let errors = validate(&SubmissionInput::new("A", "a@b.co", "0123456789")).unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::new("name", "Name must be at least 2 characters")]
        );
    }

    #[test]
    fn test_over_long_fields() {
        let name = "n".repeat(NAME_MAX + 1);
        let message = "m".repeat(MESSAGE_MAX + 1);
        let errors = validate(&SubmissionInput::new(&name, "a@b.co", &message)).unwrap_err();
        assert_eq!(fields(&errors), vec!["name", "message"]);
        assert_eq!(errors[0].message, "Name must be less than 50 characters");
        assert_eq!(errors[1].message, "Message must be less than 1000 characters");
    }

    #[test]
    fn test_all_violations_reported_together() {
        let errors = validate(&SubmissionInput::new("A", "not-an-email", "short")).unwrap_err();
        assert_eq!(fields(&errors), vec!["name", "email", "message"]);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // two characters, four bytes
        assert!(validate(&SubmissionInput::new("Ōé", "a@b.co", "0123456789")).is_ok());
        let errors = validate(&SubmissionInput::new("Ō", "a@b.co", "0123456789")).unwrap_err();
        assert_eq!(fields(&errors), vec!["name"]);
    }

    #[test]
    fn test_email_syntax() {
        for good in ["a@b.co", "first.last+tag@mail.example.org", "o'neil@example.ie", "'quoted@example.com"] {
            assert!(EMAIL_PATTERN.is_match(good), "{} should be accepted", good);
        }
        for bad in ["a@b", "a@b.c", "@b.co", "a@.co", ".a@b.co", "a..b@b.co", "a b@b.co", "a@-b.co", "a@b.co ", "o'@example.com", "a.@b.co"] {
            assert!(!EMAIL_PATTERN.is_match(bad), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_missing_and_mistyped_fields() {
        let input = SubmissionInput::from_json(json!({
            "name": 42,
            "message": null,
            "website": ["x"],
        }))
        .unwrap();

        let errors = validate(&input).unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::new("name", "Expected string, received number"),
                FieldError::new("email", "Required"),
                FieldError::new("message", "Required"),
                FieldError::new("website", "Expected string, received array"),
            ]
        );
    }

    #[test]
    fn test_non_object_body() {
        let errors = SubmissionInput::from_json(json!(["Al", "a@b.co"])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].path.is_empty());
        assert_eq!(errors[0].field(), None);
        assert_eq!(errors[0].message, "Expected object, received array");
    }

    #[test]
    fn test_unknown_keys_ignored_and_website_kept() {
        let input = SubmissionInput::from_json(json!({
            "name": "Alice",
            "email": "alice@example.com",
            "message": "Hello there, friend.",
            "website": "  ",
            "extra": true,
        }))
        .unwrap();

        let validated = validate(&input).unwrap();
        assert_eq!(validated.website.as_deref(), Some("  "));
    }

    #[test]
    fn test_field_error_serialization() {
        let value = serde_json::to_value(FieldError::new("email", "Required")).unwrap();
        assert_eq!(value, json!({ "path": ["email"], "message": "Required" }));
    }
}
