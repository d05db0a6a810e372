//! Per-client sliding-window admission control.
//!
//! Each client identifier maps to the instants of its recently admitted
//! requests. On every check the list is pruned to the last `window`; when
//! fewer than `max_requests` remain, the request is admitted and `now` is
//! recorded. Otherwise it is denied with
//! `retry_after = window - (now - oldest)`.
//!
//! Client identity is an opaque string; deriving it (proxy headers etc.) is
//! the caller's business. Empty per-client entries are dropped by
//! [`AdmissionController::cleanup_expired`], which is housekeeping only.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::constants::{DEFAULT_RATE_MAX_REQUESTS, DEFAULT_RATE_WINDOW};

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Request may proceed; it has been counted against the window.
    Admitted,
    /// Request is over the limit. Not counted.
    Denied {
        /// How long until the oldest counted request leaves the window.
        retry_after: Duration,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Admission::Admitted => None,
            Admission::Denied { retry_after } => Some(*retry_after),
        }
    }
}

/// Sliding-window request counter keyed by client identifier.
///
/// Safe to share across tasks: each client's entry is guarded by its own
/// DashMap shard lock, so checks for different clients do not serialize.
pub struct AdmissionController {
    clients: DashMap<String, VecDeque<Instant>>,
    window: Duration,
    max_requests: usize,
}

impl std::fmt::Debug for AdmissionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionController")
            .field("window", &self.window)
            .field("max_requests", &self.max_requests)
            .field("tracked_clients", &self.clients.len())
            .finish()
    }
}

impl Default for AdmissionController {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_WINDOW, DEFAULT_RATE_MAX_REQUESTS)
    }
}

impl AdmissionController {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            clients: DashMap::new(),
            window,
            max_requests,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Check (and on success, record) a request from `client_id` now.
    pub fn check(&self, client_id: &str) -> Admission {
        self.check_at(client_id, Instant::now())
    }

    /// [`check`](Self::check) evaluated at an explicit instant.
    pub fn check_at(&self, client_id: &str, now: Instant) -> Admission {
        let mut entry = self.clients.entry(client_id.to_string()).or_default();
        let timestamps = entry.value_mut();
        prune(timestamps, now, self.window);

        if timestamps.len() < self.max_requests {
            timestamps.push_back(now);
            tracing::debug!(client = client_id, count = timestamps.len(), "request admitted");
            return Admission::Admitted;
        }

        let retry_after = match timestamps.iter().min() {
            Some(oldest) => self
                .window
                .saturating_sub(now.saturating_duration_since(*oldest)),
            None => self.window,
        };
        tracing::warn!(
            client = client_id,
            retry_after_ms = retry_after.as_millis() as u64,
            "request denied by rate limiter"
        );
        Admission::Denied { retry_after }
    }

    /// Prune every client and drop the ones with nothing left in the window.
    /// Returns how many client entries were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    /// [`cleanup_expired`](Self::cleanup_expired) evaluated at an explicit instant.
    pub fn cleanup_expired_at(&self, now: Instant) -> usize {
        let before = self.clients.len();
        self.clients.retain(|_, timestamps| {
            prune(timestamps, now, self.window);
            !timestamps.is_empty()
        });
        before.saturating_sub(self.clients.len())
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }

    /// Forget all clients.
    pub fn clear(&self) {
        self.clients.clear();
    }
}

/// Keep only timestamps strictly inside `(now - window, now]`.
fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    timestamps.retain(|t| now.saturating_duration_since(*t) < window);
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(10);

    #[test]
    fn test_first_request_admitted() {
        let limiter = AdmissionController::default();
        assert_eq!(limiter.check("client-a"), Admission::Admitted);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_limit_within_window() {
        let limiter = AdmissionController::new(WINDOW, 5);
        let t0 = Instant::now();
        for i in 0..5 {
            let now = t0 + Duration::from_millis(i * 100);
            assert!(limiter.check_at("c", now).is_admitted(), "request {i}");
        }

        let denied = limiter.check_at("c", t0 + Duration::from_secs(1));
        let retry = denied.retry_after().expect("sixth request should be denied");
        assert!(retry > Duration::ZERO);
        // Oldest was at t0, one second has passed.
        assert_eq!(retry, Duration::from_secs(9));
    }

    #[test]
    fn test_admitted_again_after_window() {
        let limiter = AdmissionController::new(WINDOW, 5);
        let t0 = Instant::now();
        for _ in 0..5 {
            assert!(limiter.check_at("c", t0).is_admitted());
        }
        assert!(!limiter.check_at("c", t0 + Duration::from_secs(5)).is_admitted());
        assert!(limiter.check_at("c", t0 + WINDOW).is_admitted());
    }

    #[test]
    fn test_denied_requests_are_not_counted() {
        let limiter = AdmissionController::new(WINDOW, 1);
        let t0 = Instant::now();
        assert!(limiter.check_at("c", t0).is_admitted());
        for s in 1..10 {
            assert!(!limiter.check_at("c", t0 + Duration::from_secs(s)).is_admitted());
        }
        // Only the first request counted, so it frees up exactly at t0 + window.
        assert!(limiter.check_at("c", t0 + WINDOW).is_admitted());
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = AdmissionController::new(WINDOW, 1);
        let t0 = Instant::now();
        assert!(limiter.check_at("a", t0).is_admitted());
        assert!(!limiter.check_at("a", t0).is_admitted());
        assert!(limiter.check_at("b", t0).is_admitted());
    }

    #[test]
    fn test_cleanup_removes_idle_clients() {
        let limiter = AdmissionController::new(WINDOW, 5);
        let t0 = Instant::now();
        limiter.check_at("idle", t0);
        limiter.check_at("busy", t0 + Duration::from_secs(8));

        assert_eq!(limiter.cleanup_expired_at(t0 + Duration::from_secs(12)), 1);
        assert_eq!(limiter.tracked_clients(), 1);

        limiter.clear();
        assert_eq!(limiter.tracked_clients(), 0);
    }

    #[test]
    fn test_zero_quota_always_denies() {
        let limiter = AdmissionController::new(WINDOW, 0);
        assert_eq!(
            limiter.check("c"),
            Admission::Denied {
                retry_after: WINDOW
            }
        );
    }
}
