//! Schema validation for raw contact-form payloads.
//!
//! The payload arrives as untyped JSON. [`validate_submission`] either turns
//! it into a [`ContactSubmission`] or reports every failed check so the form
//! can highlight all problems at once. Validation has no side effects.
//!
//! Lengths are counted in Unicode scalar values, not bytes.

use email_address::EmailAddress;
use serde_json::{Map, Value};

use crate::{ContactSubmission, FieldError, FieldErrorCode};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 255;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 1000;

/// Validates `payload` against the contact-form schema.
pub fn validate_submission(payload: &Value) -> Result<ContactSubmission, Vec<FieldError>> {
    let Value::Object(fields) = payload else {
        return Err(vec![FieldError::new(
            FieldErrorCode::InvalidType,
            None,
            format!("Expected object, received {}", json_type_name(payload)),
        )]);
    };

    let mut errors = Vec::new();

    let name = string_field(fields, "name", &mut errors);
    if let Some(name) = name {
        check_length(
            &mut errors,
            "name",
            name,
            NAME_MIN_CHARS,
            NAME_MAX_CHARS,
            "Name must be at least 2 characters",
            "Name too long",
        );
    }

    let email = string_field(fields, "email", &mut errors);
    if let Some(email) = email {
        if !is_valid_email(email) {
            errors.push(FieldError::new(
                FieldErrorCode::InvalidString,
                Some("email"),
                "Invalid email address",
            ));
        }
        if email.chars().count() > EMAIL_MAX_CHARS {
            errors.push(FieldError::new(
                FieldErrorCode::TooBig,
                Some("email"),
                "Email too long",
            ));
        }
    }

    let message = string_field(fields, "message", &mut errors);
    if let Some(message) = message {
        check_length(
            &mut errors,
            "message",
            message,
            MESSAGE_MIN_CHARS,
            MESSAGE_MAX_CHARS,
            "Message must be at least 10 characters",
            "Message too long",
        );
    }

    match (name, email, message) {
        (Some(name), Some(email), Some(message)) if errors.is_empty() => Ok(ContactSubmission::new(
            name.to_owned(),
            email.to_owned(),
            message.to_owned(),
        )),
        _ => Err(errors),
    }
}

fn string_field<'a>(
    fields: &'a Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    match fields.get(field) {
        Some(Value::String(s)) => Some(s.as_str()),
        None => {
            errors.push(FieldError::new(
                FieldErrorCode::InvalidType,
                Some(field),
                "Required",
            ));
            None
        }
        Some(other) => {
            errors.push(FieldError::new(
                FieldErrorCode::InvalidType,
                Some(field),
                format!("Expected string, received {}", json_type_name(other)),
            ));
            None
        }
    }
}

fn check_length(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
    too_small: &str,
    too_big: &str,
) {
    let len = value.chars().count();
    if len < min {
        errors.push(FieldError::new(FieldErrorCode::TooSmall, Some(field), too_small));
    }
    if len > max {
        errors.push(FieldError::new(FieldErrorCode::TooBig, Some(field), too_big));
    }
}

/// RFC 5322 address grammar (including the 64-character local-part limit),
/// restricted to addresses whose domain has at least one dot and an
/// alphabetic top-level label of two or more characters.
/// Bare hosts (`user@localhost`) and IP-literal domains are rejected.
fn is_valid_email(candidate: &str) -> bool {
    if !EmailAddress::is_valid(candidate) {
        return false;
    }
    let Some((_, domain)) = candidate.rsplit_once('@') else {
        return false;
    };
    let Some((_, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

fn json_type_name(value: &Value) -> &'static str {
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
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn payload(name: &str, email: &str, message: &str) -> Value {
        json!({ "name": name, "email": email, "message": message })
    }

    fn fields_of(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().filter_map(FieldError::field).collect()
    }

    #[test]
    fn minimal_valid_submission_passes() {
        let submission =
            validate_submission(&payload("Al", "al@example.com", "0123456789")).unwrap();

        assert_eq!(submission.name(), "Al");
        assert_eq!(submission.email(), "al@example.com");
        assert_eq!(submission.message(), "0123456789");
    }

    #[test]
    fn one_character_name_is_too_small() {
        let errors = validate_submission(&payload("A", "a@example.com", "long enough message")).unwrap_err();

        assert_eq!(
            errors,
            vec![FieldError::new(
                FieldErrorCode::TooSmall,
                Some("name"),
                "Name must be at least 2 characters"
            )]
        );
    }

    #[test]
    fn nine_character_message_is_too_small() {
        let errors = validate_submission(&payload("Alice", "a@example.com", "123456789")).unwrap_err();

        assert_eq!(fields_of(&errors), vec!["message"]);
        assert_eq!(errors[0].code, FieldErrorCode::TooSmall);
        assert_eq!(errors[0].message, "Message must be at least 10 characters");
    }

    #[test]
    fn email_without_at_sign_is_invalid() {
        let errors = validate_submission(&payload("Alice", "alice.example.com", "long enough message")).unwrap_err();

        assert_eq!(
            errors,
            vec![FieldError::new(
                FieldErrorCode::InvalidString,
                Some("email"),
                "Invalid email address"
            )]
        );
    }

    #[test]
    fn email_requires_dotted_domain() {
        for bad in ["user@localhost", "user@example.c0m", "user@", "@example.com", "a b@example.com"] {
            let errors = validate_submission(&payload("Alice", bad, "long enough message")).unwrap_err();
            assert_eq!(fields_of(&errors), vec!["email"], "{bad} should be rejected");
        }
        for good in ["first.last@sub.example.org", "o'brien+tag@example.co"] {
            assert!(
                validate_submission(&payload("Alice", good, "long enough message")).is_ok(),
                "{good} should be accepted"
            );
        }
    }

    #[test]
    fn upper_bounds_are_inclusive() {
        let name = "n".repeat(NAME_MAX_CHARS);
        let message = "m".repeat(MESSAGE_MAX_CHARS);
        assert!(validate_submission(&payload(&name, "a@example.com", &message)).is_ok());

        let name = "n".repeat(NAME_MAX_CHARS + 1);
        let message = "m".repeat(MESSAGE_MAX_CHARS + 1);
        let errors = validate_submission(&payload(&name, "a@example.com", &message)).unwrap_err();
        assert_eq!(fields_of(&errors), vec!["name", "message"]);
        assert!(errors.iter().all(|e| e.code == FieldErrorCode::TooBig));
    }

    #[test]
    fn overlong_email_reports_length() {
        let email = format!("{}@example.com", "a".repeat(250));
        let errors = validate_submission(&payload("Alice", &email, "long enough message")).unwrap_err();

        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["Invalid email address", "Email too long"]);
        assert_eq!(fields_of(&errors), vec!["email", "email"]);
    }

    #[test]
    fn local_part_over_sixty_four_characters_is_invalid() {
        let at_limit = format!("{}@example.com", "a".repeat(64));
        let over_limit = format!("{}@example.com", "a".repeat(65));

        assert!(validate_submission(&payload("Alice", &at_limit, "long enough message")).is_ok());
        let errors =
            validate_submission(&payload("Alice", &over_limit, "long enough message")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid email address");
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        // Two characters, six bytes.
        assert!(validate_submission(&payload("日本", "a@example.com", "ünïcödé ok!")).is_ok());
    }

    #[test]
    fn every_failing_field_is_reported() {
        let errors = validate_submission(&json!({ "name": 42, "email": "nope" })).unwrap_err();

        assert_eq!(
            errors,
            vec![
                FieldError::new(FieldErrorCode::InvalidType, Some("name"), "Expected string, received number"),
                FieldError::new(FieldErrorCode::InvalidString, Some("email"), "Invalid email address"),
                FieldError::new(FieldErrorCode::InvalidType, Some("message"), "Required"),
            ]
        );
    }

    #[test]
    fn non_object_payload_is_rejected_as_a_whole() {
        let errors = validate_submission(&json!(["name", "email"])).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(errors[0].path.is_empty());
        assert_eq!(errors[0].message, "Expected object, received array");
        assert_eq!(
            validate_submission(&Value::Null).unwrap_err()[0].message,
            "Expected object, received null"
        );
    }
}
