//! Request orchestration for a single contact submission.
//!
//! A submission moves through [`SubmissionState`] in order and stops at the
//! first failing stage:
//!
//! | Stage | Failure | Terminal error |
//! |-------|---------|----------------|
//! | configuration check | no webhook target | [`ContactError::Configuration`] |
//! | `Received → RateChecked` | allowance used up | [`ContactError::RateLimited`] |
//! | `RateChecked → Validated` | schema violation | [`ContactError::InvalidSubmission`] |
//! | `Validated → Formatted` | n/a | n/a |
//! | `Formatted → Delivered` | target rejected / unreachable | [`ContactError::Delivery`] |
//!
//! The configuration check comes first so a misconfigured server answers
//! every call the same way and does not spend anyone's rate-limit allowance.
//! Once a request passes the rate check it stays counted, even if delivery
//! later fails.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::{
    format_notification, validate_submission, ClientKey, ContactError, DeliveryError,
    FixedWindowLimiter, NotificationBranding, NotificationSink, RateLimitDecision, SubmissionId,
    Timestamp,
};

/// Returned to the client with HTTP 200.
pub const SUCCESS_MESSAGE: &str = "Message sent successfully! I'll get back to you soon.";

/// Pipeline stages a submission passes through on its way to delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionState {
    Received,
    RateChecked,
    Validated,
    Formatted,
    Delivered,
}

impl SubmissionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionState::Received => "received",
            SubmissionState::RateChecked => "rate_checked",
            SubmissionState::Validated => "validated",
            SubmissionState::Formatted => "formatted",
            SubmissionState::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof of a successfully delivered submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactReceipt {
    pub submission_id: SubmissionId,
    pub delivered_at: Timestamp,
}

/// The contact intake pipeline.
///
/// All collaborators are injected: the shared [`FixedWindowLimiter`], the
/// [`NotificationSink`] (absent when no webhook target is configured) and the
/// notification branding. One instance serves every request.
pub struct ContactIntake {
    limiter: Arc<FixedWindowLimiter>,
    sink: Option<Arc<dyn NotificationSink>>,
    branding: NotificationBranding,
}

impl std::fmt::Debug for ContactIntake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactIntake")
            .field("limiter", &self.limiter)
            .field("sink_configured", &self.sink.is_some())
            .field("branding", &self.branding)
            .finish()
    }
}

impl ContactIntake {
    pub fn new(
        limiter: Arc<FixedWindowLimiter>,
        sink: Option<Arc<dyn NotificationSink>>,
        branding: NotificationBranding,
    ) -> Self {
        Self {
            limiter,
            sink,
            branding,
        }
    }

    /// The shared rate limiter (used by the server's sweep task).
    pub fn limiter(&self) -> &Arc<FixedWindowLimiter> {
        &self.limiter
    }

    /// Returns `true` when a delivery target is configured.
    pub fn is_configured(&self) -> bool {
        self.sink.is_some()
    }

    /// Runs `payload` from `client` through the whole pipeline exactly once.
    pub async fn submit(
        &self,
        client: &ClientKey,
        payload: &Value,
    ) -> Result<ContactReceipt, ContactError> {
        let submission_id = SubmissionId::new_random();
        let span = info_span!("contact_submission", %submission_id, %client);

        self.process(submission_id, client, payload)
            .instrument(span)
            .await
    }

    async fn process(
        &self,
        submission_id: SubmissionId,
        client: &ClientKey,
        payload: &Value,
    ) -> Result<ContactReceipt, ContactError> {
        debug!(state = %SubmissionState::Received, "submission received");

        let Some(sink) = self.sink.as_ref() else {
            error!("no webhook URL configured; cannot deliver contact submissions");
            return Err(ContactError::Configuration {
                message: "webhook URL is not configured".to_owned(),
            });
        };

        match self.limiter.check(client) {
            RateLimitDecision::Allowed { count } => {
                debug!(state = %SubmissionState::RateChecked, count, "rate limit passed");
            }
            RateLimitDecision::Denied => {
                warn!("submission rejected by rate limiter");
                return Err(ContactError::RateLimited);
            }
        }

        let submission = validate_submission(payload).map_err(|details| {
            info!(issues = details.len(), "submission failed validation");
            ContactError::InvalidSubmission { details }
        })?;
        debug!(state = %SubmissionState::Validated, "submission validated");

        let message = format_notification(&submission, &self.branding, Timestamp::now());
        debug!(state = %SubmissionState::Formatted, "notification formatted");

        if let Err(err) = sink.deliver(&message).await {
            match &err {
                DeliveryError::Rejected { status } => {
                    error!(status, "webhook target rejected notification");
                }
                DeliveryError::Transport { message } => {
                    error!(error = %message, "webhook delivery failed");
                }
            }
            return Err(err.into());
        }

        let receipt = ContactReceipt {
            submission_id,
            delivered_at: Timestamp::now(),
        };
        info!(state = %SubmissionState::Delivered, "contact submission delivered");
        Ok(receipt)
    }
}
