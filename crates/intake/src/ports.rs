//! Port traits the intake domain needs from the outside world.
//!
//! Infrastructure crates implement these; the domain only ever sees the
//! traits. This keeps [`crate::ContactIntake`] testable with in-memory fakes.

use std::fmt::Debug;
use std::time::Instant;

use async_trait::async_trait;

use crate::{DeliveryError, NotificationMessage};

/// Port for obtaining the current monotonic time.
///
/// Production code uses [`SystemClock`]; tests use
/// [`crate::testing::MockClock`] to step through rate-limit windows.
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Port for delivering a formatted notification to its external target.
///
/// Implementations make exactly one attempt. They must not retry, and they
/// must report target-specific detail only through the returned
/// [`DeliveryError`] (which the domain logs but never shows to clients).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver `message` once.
    async fn deliver(&self, message: &NotificationMessage) -> Result<(), DeliveryError>;
}
