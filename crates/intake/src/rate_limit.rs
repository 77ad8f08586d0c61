//! Fixed-window rate limiting per client.
//!
//! Each [`ClientKey`] gets a counter and the instant its current window began.
//! The counter resets only when a request arrives after the window has fully
//! elapsed, so a client can land `max_requests` at the end of one window and
//! `max_requests` more at the start of the next. That boundary burst is part
//! of the fixed-window contract and must not be smoothed away.
//!
//! The table is bounded. Entries whose window has elapsed are dropped by
//! [`FixedWindowLimiter::sweep_expired`] (driven periodically by the server)
//! and opportunistically when the table is full. Dropping an expired entry
//! never changes a decision: its next check would have reset it anyway.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{ClientKey, Clock};

/// Default number of accepted submissions per client per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 5;
/// Default window length (15 minutes).
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);
/// Default upper bound on the number of clients tracked at once.
pub const DEFAULT_MAX_TRACKED_CLIENTS: usize = 10_000;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables for [`FixedWindowLimiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Accepted submissions per client within one window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
    /// Maximum number of client entries held in memory.
    pub max_tracked_clients: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
            max_tracked_clients: DEFAULT_MAX_TRACKED_CLIENTS,
        }
    }
}

/// Rejected [`RateLimitConfig`] value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitConfigError {
    #[error("max_requests must be at least 1")]
    ZeroMaxRequests,
    #[error("window must be longer than zero")]
    ZeroWindow,
    #[error("max_tracked_clients must be at least 1")]
    ZeroCapacity,
}

impl RateLimitConfig {
    /// Checks that every tunable is usable.
    pub fn validate(&self) -> Result<(), RateLimitConfigError> {
        if self.max_requests == 0 {
            return Err(RateLimitConfigError::ZeroMaxRequests);
        }
        if self.window.is_zero() {
            return Err(RateLimitConfigError::ZeroWindow);
        }
        if self.max_tracked_clients == 0 {
            return Err(RateLimitConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Counter state for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests accepted in the current window.
    pub count: u32,
    /// When the current window began.
    pub window_start: Instant,
}

/// Outcome of [`FixedWindowLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The request is accepted; `count` is the client's total in this window
    /// including this request.
    Allowed { count: u32 },
    /// The client has used its allowance for this window.
    Denied,
}

impl RateLimitDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

#[derive(Debug, Default)]
struct LimiterState {
    entries: HashMap<ClientKey, RateLimitEntry>,
    // Ordered by window start so the oldest windows are evicted first.
    by_window_start: BTreeSet<(Instant, ClientKey)>,
}

impl LimiterState {
    fn sweep(&mut self, now: Instant, window: Duration) -> usize {
        let mut removed = 0;
        while let Some(start) = self.by_window_start.first().map(|(start, _)| *start) {
            if now.saturating_duration_since(start) <= window {
                break;
            }
            if let Some((_, key)) = self.by_window_start.pop_first() {
                self.entries.remove(&key);
                removed += 1;
            }
        }
        removed
    }
}

// ---------------------------------------------------------------------------
// Limiter
// ---------------------------------------------------------------------------

/// Process-wide fixed-window counter keyed by [`ClientKey`].
///
/// Every [`check`](Self::check) is a single read-modify-write under one lock,
/// so concurrent requests from the same client never lose an increment. The
/// lock is never held across an `.await`.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<LimiterState>,
}

impl FixedWindowLimiter {
    /// Creates an empty limiter.
    ///
    /// Returns an error if `config` fails [`RateLimitConfig::validate`].
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Result<Self, RateLimitConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            state: Mutex::new(LimiterState::default()),
        })
    }

    /// The settings this limiter was built with.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Records a request from `key` and decides whether it may proceed.
    pub fn check(&self, key: &ClientKey) -> RateLimitDecision {
        let now = self.clock.now();
        let window = self.config.window;

        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(entry) = state.entries.get_mut(key) else {
            self.make_room(state, now);
            state.entries.insert(
                key.clone(),
                RateLimitEntry {
                    count: 1,
                    window_start: now,
                },
            );
            state.by_window_start.insert((now, key.clone()));
            return RateLimitDecision::Allowed { count: 1 };
        };

        if now.saturating_duration_since(entry.window_start) > window {
            let previous_start = entry.window_start;
            entry.count = 1;
            entry.window_start = now;
            state.by_window_start.remove(&(previous_start, key.clone()));
            state.by_window_start.insert((now, key.clone()));
            debug!(client = %key, "rate-limit window reset");
            return RateLimitDecision::Allowed { count: 1 };
        }

        if entry.count >= self.config.max_requests {
            return RateLimitDecision::Denied;
        }

        entry.count += 1;
        RateLimitDecision::Allowed { count: entry.count }
    }

    /// Drops every entry whose window has elapsed. Returns how many were
    /// removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = self.state.lock().sweep(now, self.config.window);
        if removed > 0 {
            debug!(removed, "swept expired rate-limit entries");
        }
        removed
    }

    /// Current state for `key`, if tracked.
    pub fn entry(&self, key: &ClientKey) -> Option<RateLimitEntry> {
        self.state.lock().entries.get(key).copied()
    }

    /// Number of clients currently tracked.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn make_room(&self, state: &mut LimiterState, now: Instant) {
        if state.entries.len() < self.config.max_tracked_clients {
            return;
        }

        state.sweep(now, self.config.window);

        while state.entries.len() >= self.config.max_tracked_clients {
            let Some((_, evicted)) = state.by_window_start.pop_first() else {
                break;
            };
            state.entries.remove(&evicted);
            warn!(
                client = %evicted,
                capacity = self.config.max_tracked_clients,
                "rate-limit table full; evicted client with the oldest active window"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::testing::MockClock;

    use super::*;

    fn key(s: &str) -> ClientKey {
        ClientKey::new(s).unwrap()
    }

    fn limiter_with(config: RateLimitConfig) -> (FixedWindowLimiter, MockClock) {
        let clock = MockClock::default();
        let limiter = FixedWindowLimiter::new(config, Arc::new(clock.clone())).unwrap();
        (limiter, clock)
    }

    fn limiter() -> (FixedWindowLimiter, MockClock) {
        limiter_with(RateLimitConfig::default())
    }

    #[test]
    fn sixth_request_in_window_is_denied() {
        let (limiter, clock) = limiter();
        let client = key("203.0.113.9");

        for expected in 1..=5 {
            assert_eq!(
                limiter.check(&client),
                RateLimitDecision::Allowed { count: expected }
            );
            clock.advance(Duration::from_secs(60));
        }

        assert_eq!(limiter.check(&client), RateLimitDecision::Denied);
        assert_eq!(limiter.check(&client), RateLimitDecision::Denied);
        assert_eq!(limiter.entry(&client).unwrap().count, 5);
    }

    #[test]
    fn clients_are_counted_independently() {
        let (limiter, _clock) = limiter();
        let a = key("a");
        let b = key("b");

        for _ in 0..5 {
            assert!(limiter.check(&a).is_allowed());
        }
        assert!(!limiter.check(&a).is_allowed());
        assert!(limiter.check(&b).is_allowed());
    }

    #[test]
    fn window_resets_only_after_full_duration() {
        let (limiter, clock) = limiter();
        let client = key("c");
        let started = clock.now();

        for _ in 0..5 {
            limiter.check(&client);
        }

        // Exactly at the boundary the window is still open.
        clock.set(started + DEFAULT_WINDOW);
        assert_eq!(limiter.check(&client), RateLimitDecision::Denied);

        clock.set(started + DEFAULT_WINDOW + Duration::from_millis(1));
        assert_eq!(
            limiter.check(&client),
            RateLimitDecision::Allowed { count: 1 }
        );

        let entry = limiter.entry(&client).unwrap();
        assert_eq!(entry.count, 1);
        assert_eq!(entry.window_start, clock.now());
    }

    #[test]
    fn boundary_burst_is_preserved() {
        let (limiter, clock) = limiter();
        let client = key("burst");

        assert!(limiter.check(&client).is_allowed());
        clock.advance(DEFAULT_WINDOW - Duration::from_secs(1));
        for _ in 0..4 {
            assert!(limiter.check(&client).is_allowed());
        }

        // Two seconds later a fresh window opens and five more are accepted,
        // ten in total within a few seconds.
        clock.advance(Duration::from_secs(2));
        for _ in 0..5 {
            assert!(limiter.check(&client).is_allowed());
        }
        assert!(!limiter.check(&client).is_allowed());
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let (limiter, clock) = limiter();
        limiter.check(&key("old"));
        clock.advance(Duration::from_secs(10 * 60));
        limiter.check(&key("recent"));

        clock.advance(Duration::from_secs(6 * 60));
        assert_eq!(limiter.sweep_expired(), 1);
        assert!(limiter.entry(&key("old")).is_none());
        assert!(limiter.entry(&key("recent")).is_some());

        clock.advance(DEFAULT_WINDOW);
        assert_eq!(limiter.sweep_expired(), 1);
        assert!(limiter.is_empty());
    }

    #[test]
    fn sweep_after_reset_uses_new_window_start() {
        let (limiter, clock) = limiter();
        let client = key("renewed");

        limiter.check(&client);
        clock.advance(DEFAULT_WINDOW + Duration::from_secs(1));
        limiter.check(&client);

        clock.advance(Duration::from_secs(60));
        assert_eq!(limiter.sweep_expired(), 0);
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn full_table_prefers_evicting_expired_entries() {
        let (limiter, clock) = limiter_with(RateLimitConfig {
            max_tracked_clients: 2,
            ..RateLimitConfig::default()
        });

        limiter.check(&key("expired"));
        clock.advance(DEFAULT_WINDOW + Duration::from_secs(1));
        limiter.check(&key("active"));
        limiter.check(&key("newcomer"));

        assert_eq!(limiter.len(), 2);
        assert!(limiter.entry(&key("expired")).is_none());
        assert!(limiter.entry(&key("active")).is_some());
        assert!(limiter.entry(&key("newcomer")).is_some());
    }

    #[test]
    fn full_table_evicts_oldest_active_window() {
        let (limiter, clock) = limiter_with(RateLimitConfig {
            max_tracked_clients: 2,
            ..RateLimitConfig::default()
        });

        limiter.check(&key("first"));
        clock.advance(Duration::from_secs(1));
        limiter.check(&key("second"));
        clock.advance(Duration::from_secs(1));
        limiter.check(&key("third"));

        assert_eq!(limiter.len(), 2);
        assert!(limiter.entry(&key("first")).is_none());
        assert!(limiter.entry(&key("second")).is_some());
        assert!(limiter.entry(&key("third")).is_some());
    }

    #[test]
    fn concurrent_checks_never_lose_updates() {
        let (limiter, _clock) = limiter_with(RateLimitConfig {
            max_requests: 1_000,
            ..RateLimitConfig::default()
        });
        let client = key("shared");

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        limiter.check(&client);
                    }
                });
            }
        });

        assert_eq!(limiter.entry(&client).unwrap().count, 400);
    }

    #[test]
    fn concurrent_burst_allows_exactly_max_requests() {
        let (limiter, _clock) = limiter();
        let client = key("racer");

        let allowed: usize = thread::scope(|scope| {
            let handles: Vec<_> = (0..20)
                .map(|_| scope.spawn(|| limiter.check(&client).is_allowed()))
                .collect();
            handles
                .into_iter()
                .map(|h| usize::from(h.join().unwrap()))
                .sum()
        });

        assert_eq!(allowed, 5);
    }

    #[test]
    fn accepted_config_is_kept() {
        let config = RateLimitConfig {
            max_requests: 3,
            window: Duration::from_secs(60),
            max_tracked_clients: 16,
        };
        let (limiter, _) = limiter_with(config);

        assert_eq!(*limiter.config(), config);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let clock: Arc<dyn Clock> = Arc::new(MockClock::default());
        let zero_max = RateLimitConfig {
            max_requests: 0,
            ..RateLimitConfig::default()
        };
        let zero_window = RateLimitConfig {
            window: Duration::ZERO,
            ..RateLimitConfig::default()
        };
        let zero_capacity = RateLimitConfig {
            max_tracked_clients: 0,
            ..RateLimitConfig::default()
        };

        assert_eq!(
            FixedWindowLimiter::new(zero_max, clock.clone()).unwrap_err(),
            RateLimitConfigError::ZeroMaxRequests
        );
        assert_eq!(
            FixedWindowLimiter::new(zero_window, clock.clone()).unwrap_err(),
            RateLimitConfigError::ZeroWindow
        );
        assert_eq!(
            FixedWindowLimiter::new(zero_capacity, clock).unwrap_err(),
            RateLimitConfigError::ZeroCapacity
        );
    }
}
