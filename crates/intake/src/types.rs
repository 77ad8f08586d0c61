//! Shared value types for the contact intake domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (a [`ContactSubmission`] has always passed
//! validation) and participate in domain computations.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// A contact-form submission that has passed every schema rule.
///
/// Only [`crate::validation::validate_submission`] constructs this type, so
/// holding one is proof that the field bounds were checked. Fields are private
/// to keep the value immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    name: String,
    email: String,
    message: String,
}

impl ContactSubmission {
    pub(crate) fn new(name: String, email: String, message: String) -> Self {
        Self {
            name,
            email,
            message,
        }
    }

    /// Sender's display name (2–100 characters).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sender's email address (≤255 characters).
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Message body (10–1000 characters).
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ---------------------------------------------------------------------------
// Validation findings
// ---------------------------------------------------------------------------

/// Machine-readable classification of a [`FieldError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    /// Field is missing or has the wrong JSON type.
    InvalidType,
    /// Value is shorter than the minimum length.
    TooSmall,
    /// Value is longer than the maximum length.
    TooBig,
    /// Value does not match the required string format (e.g. email grammar).
    InvalidString,
}

/// A single failed schema check, returned to the client as part of a
/// validation failure.
///
/// `path` names the offending field; it is empty when the payload as a whole
/// is malformed (e.g. not a JSON object).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Classification of the failure.
    pub code: FieldErrorCode,
    /// Location of the failure within the payload.
    pub path: Vec<String>,
    /// Human-readable description, safe to display in the form.
    pub message: String,
}

impl FieldError {
    pub(crate) fn new(code: FieldErrorCode, field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: field.map(|f| vec![f.to_owned()]).unwrap_or_default(),
            message: message.into(),
        }
    }

    /// Returns the field name this error relates to, if any.
    pub fn field(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp, stamped on notifications and receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// ISO-8601 rendering with millisecond precision and a `Z` suffix
    /// (e.g. `2024-05-01T12:30:00.000Z`), the form webhook targets expect.
    pub fn to_iso8601(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
