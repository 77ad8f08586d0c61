//! Portfolio chat-webhook delivery adapter.
//!
//! Implements the [`intake::NotificationSink`] trait by POSTing the
//! notification as JSON to a single configured webhook URL.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, timeouts and response classification
//! live here. The [`intake`] crate sees only [`intake::NotificationSink`] and
//! [`intake::DeliveryError`].
//!
//! ## Delivery Semantics
//!
//! One attempt per notification. There is no retry, back-off or circuit
//! breaker; a timeout is applied so a stalled target cannot hold a request
//! open indefinitely. Webhook URLs usually embed a secret token, so the URL
//! is never rendered in full by `Debug` or in log events.

use std::time::Duration;

use async_trait::async_trait;
use intake::{DeliveryError, NotificationMessage, NotificationSink};
use reqwest::Url;
use thiserror::Error;
use tracing::{debug, instrument};

/// Default upper bound on one delivery attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while constructing a [`WebhookNotifier`].
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The configured URL could not be parsed.
    #[error("Invalid webhook URL: {reason}")]
    InvalidUrl {
        /// Parser diagnostic.
        reason: String,
    },

    /// The URL uses a scheme other than `http` or `https`.
    #[error("Unsupported webhook URL scheme '{scheme}'")]
    UnsupportedScheme {
        /// The rejected scheme.
        scheme: String,
    },

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// [`NotificationSink`] that delivers to a chat webhook over HTTP(S).
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Url,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("host", &self.host())
            .finish_non_exhaustive()
    }
}

impl WebhookNotifier {
    /// Creates a notifier for `url` with a per-attempt `timeout`.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, WebhookError> {
        let url = Url::parse(url).map_err(|e| WebhookError::InvalidUrl {
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(WebhookError::UnsupportedScheme {
                scheme: url.scheme().to_owned(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portfolio-contact/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, url })
    }

    /// Host part of the target URL, safe to log.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or("<none>")
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    #[instrument(skip_all, fields(host = %self.host()))]
    async fn deliver(&self, message: &NotificationMessage) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(message)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                // Strip the URL: reqwest includes it in `Display`.
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!(
                status = status.as_u16(),
                reason = status.canonical_reason().unwrap_or(""),
                "webhook responded with non-success status"
            );
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(status = status.as_u16(), "webhook accepted notification");
        Ok(())
    }
}
