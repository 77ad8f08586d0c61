//! Core contact intake domain for the portfolio server.
//!
//! This crate contains every domain concept of the contact pipeline: client
//! identifiers, the validated submission type, the error taxonomy, the
//! fixed-window rate limiter, the schema validator, the notification formatter
//! and the [`ContactIntake`] orchestrator that sequences them. Infrastructure
//! crates implement the port traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed ([`Clock`], [`NotificationSink`]); the
//! `webhook` and `listener` crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ClientKey`, `SubmissionId`) |
//! | [`types`] | Shared value types (`ContactSubmission`, `FieldError`, `Timestamp`) |
//! | [`errors`] | Error taxonomy and client-facing messages |
//! | [`ports`] | `Clock` and `NotificationSink` traits |
//! | [`rate_limit`] | Fixed-window limiter with bounded, swept storage |
//! | [`validation`] | Schema validation of raw JSON payloads |
//! | [`notification`] | Webhook notification wire types and formatter |
//! | [`intake`] | The `ContactIntake` pipeline |

pub mod errors;
pub mod identifiers;
pub mod intake;
pub mod notification;
pub mod ports;
pub mod rate_limit;
pub mod types;
pub mod validation;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{
    ContactError, DeliveryError, CONFIGURATION_MESSAGE, DELIVERY_REJECTED_MESSAGE,
    INTERNAL_ERROR_MESSAGE, INVALID_SUBMISSION_MESSAGE, RATE_LIMITED_MESSAGE,
};
pub use identifiers::{ClientKey, SubmissionId};
pub use intake::{ContactIntake, ContactReceipt, SubmissionState, SUCCESS_MESSAGE};
pub use notification::{
    format_notification, truncate_message, Embed, EmbedField, EmbedFooter, NotificationBranding,
    NotificationMessage, MAX_NOTIFICATION_MESSAGE_CHARS, TRUNCATION_MARKER,
};
pub use ports::{Clock, NotificationSink, SystemClock};
pub use rate_limit::{
    FixedWindowLimiter, RateLimitConfig, RateLimitConfigError, RateLimitDecision, RateLimitEntry,
    DEFAULT_MAX_REQUESTS, DEFAULT_MAX_TRACKED_CLIENTS, DEFAULT_WINDOW,
};
pub use types::{ContactSubmission, FieldError, FieldErrorCode, Timestamp};
pub use validation::validate_submission;
