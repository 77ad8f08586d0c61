//! Error taxonomy for the contact intake pipeline.
//!
//! [`ContactError`] covers every way a submission can end without being
//! delivered. Each variant is terminal for its request: nothing in the
//! pipeline retries.
//!
//! Two renderings exist for every error. `Display` may carry operator-facing
//! detail (status codes, transport messages) and is only ever logged.
//! [`ContactError::client_message`] returns a fixed string that is safe to send
//! back to the browser and never mentions the delivery target.

use thiserror::Error;

use crate::FieldError;

// ---------------------------------------------------------------------------
// Client-facing messages
// ---------------------------------------------------------------------------

/// Returned with HTTP 429.
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please try again later.";
/// Returned with HTTP 400, alongside the field-level details.
pub const INVALID_SUBMISSION_MESSAGE: &str = "Invalid form data";
/// Returned with HTTP 500 when no webhook target is configured.
pub const CONFIGURATION_MESSAGE: &str = "Server configuration error";
/// Returned with HTTP 500 when the webhook target rejects the notification.
pub const DELIVERY_REJECTED_MESSAGE: &str = "Failed to send message. Please try again.";
/// Returned with HTTP 500 for transport failures and anything unexpected.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error. Please try again.";

// ---------------------------------------------------------------------------
// Delivery errors
// ---------------------------------------------------------------------------

/// Failure reported by a [`crate::NotificationSink`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The target answered with a non-success HTTP status.
    #[error("Webhook target rejected the notification with status {status}")]
    Rejected {
        /// HTTP status code returned by the target.
        status: u16,
    },

    /// The request never produced a response (connect failure, timeout, TLS
    /// error, body encoding failure).
    #[error("Webhook transport failure: {message}")]
    Transport {
        /// Description of the underlying transport error.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Pipeline errors
// ---------------------------------------------------------------------------

/// Terminal outcome of a submission that was not delivered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContactError {
    /// The client exhausted its allowance for the current window.
    ///
    /// Recoverable by waiting for the window to reset.
    #[error("Client exceeded the submission rate limit")]
    RateLimited,

    /// The payload failed one or more schema checks.
    ///
    /// Recoverable by correcting the input; `details` is returned to the client.
    #[error("Submission failed validation with {} issue(s)", .details.len())]
    InvalidSubmission {
        /// Every failed check, in field order.
        details: Vec<FieldError>,
    },

    /// The server is missing required configuration (e.g. the webhook URL).
    ///
    /// Operator-facing; the client only sees a generic message.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The notification could not be delivered to the webhook target.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Catch-all for failures that fit no other category.
    #[error("Unexpected error: {message}")]
    Unexpected {
        /// Description of the failure.
        message: String,
    },
}

impl ContactError {
    /// Returns the fixed message that may be shown to the client.
    pub fn client_message(&self) -> &'static str {
        match self {
            ContactError::RateLimited => RATE_LIMITED_MESSAGE,
            ContactError::InvalidSubmission { .. } => INVALID_SUBMISSION_MESSAGE,
            ContactError::Configuration { .. } => CONFIGURATION_MESSAGE,
            ContactError::Delivery(DeliveryError::Rejected { .. }) => DELIVERY_REJECTED_MESSAGE,
            ContactError::Delivery(DeliveryError::Transport { .. })
            | ContactError::Unexpected { .. } => INTERNAL_ERROR_MESSAGE,
        }
    }
}
