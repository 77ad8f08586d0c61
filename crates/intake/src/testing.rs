//! Test doubles for the intake ports.
//!
//! Compiled for this crate's own tests and, with the `test-util` feature, for
//! downstream crates' tests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{Clock, DeliveryError, NotificationMessage, NotificationSink};

/// Clock whose time only moves when told to.
///
/// Clones share the same underlying instant, so a clone handed to a
/// [`crate::FixedWindowLimiter`] can be advanced from the test body.
#[derive(Debug, Clone)]
pub struct MockClock {
    current_time: Arc<Mutex<Instant>>,
}

impl MockClock {
    /// Create a mock clock starting at a specific instant.
    pub fn new(start: Instant) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        *self.current_time.lock() += duration;
    }

    /// Set the clock to a specific instant.
    pub fn set(&self, instant: Instant) {
        *self.current_time.lock() = instant;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.current_time.lock()
    }
}

/// In-memory [`NotificationSink`] that records every message it receives and
/// answers with a preconfigured result.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    delivered: Arc<Mutex<Vec<NotificationMessage>>>,
    failure: Arc<Mutex<Option<DeliveryError>>>,
}

impl RecordingSink {
    /// Sink that accepts every message.
    pub fn accepting() -> Self {
        Self::default()
    }

    /// Sink that records every message and then fails with `error`.
    pub fn failing(error: DeliveryError) -> Self {
        let sink = Self::default();
        *sink.failure.lock() = Some(error);
        sink
    }

    /// Messages received so far, in arrival order.
    pub fn delivered(&self) -> Vec<NotificationMessage> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, message: &NotificationMessage) -> Result<(), DeliveryError> {
        self.delivered.lock().push(message.clone());
        match self.failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
