//! # Quota Module
//!
//! Cooperative request gating. The tracker holds no policy of its own: it mirrors
//! the allowance the lookup endpoint advertises after each call and refuses to
//! send while that allowance is spent and the reset deadline has not passed.

use chrono::{DateTime, TimeDelta, Utc};
use log::debug;

use crate::error::LookupError;
use crate::models::QuotaState;

/// Allowance assumed before the first response and when a response carries no hint.
pub const DEFAULT_REMAINING: i64 = 45;
/// Window length assumed when a response carries no TTL hint.
pub const DEFAULT_TTL_SECONDS: i64 = 60;
/// Upper bound applied to advertised TTLs.
const MAX_TTL_SECONDS: i64 = 86_400;

#[derive(Debug, Clone)]
pub struct QuotaTracker {
    state: QuotaState,
    default_remaining: i64,
    default_ttl_seconds: i64,
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new(DEFAULT_REMAINING, DEFAULT_TTL_SECONDS)
    }
}

impl QuotaTracker {
    pub fn new(default_remaining: i64, default_ttl_seconds: i64) -> Self {
        QuotaTracker {
            state: QuotaState::new(default_remaining),
            default_remaining,
            default_ttl_seconds,
        }
    }

    pub fn state(&self) -> &QuotaState {
        &self.state
    }

    pub fn default_remaining(&self) -> i64 {
        self.default_remaining
    }

    pub fn default_ttl_seconds(&self) -> i64 {
        self.default_ttl_seconds
    }

    pub fn check(&self) -> Result<(), LookupError> {
        self.check_at(Utc::now())
    }

    /// Fails with `RateLimitExceeded` iff `remaining <= 0` and `now < reset_at`.
    pub fn check_at(&self, now: DateTime<Utc>) -> Result<(), LookupError> {
        if self.state.is_exhausted_at(now) {
            return Err(LookupError::RateLimitExceeded {
                wait_seconds: self.wait_seconds(now),
            });
        }
        Ok(())
    }

    /// Seconds until the reset deadline, zero once it has passed.
    pub fn wait_seconds(&self, now: DateTime<Utc>) -> f64 {
        let left = self.state.reset_at - now;
        (left.num_milliseconds() as f64 / 1000.0).max(0.0)
    }

    pub fn update(&mut self, remaining: Option<i64>, ttl_seconds: Option<i64>) -> i64 {
        self.update_at(remaining, ttl_seconds, Utc::now())
    }

    /// Record the server's view after a completed exchange and return the TTL applied.
    /// Missing hints fall back to defaults.
    pub fn update_at(
        &mut self,
        remaining: Option<i64>,
        ttl_seconds: Option<i64>,
        now: DateTime<Utc>,
    ) -> i64 {
        let remaining = remaining.unwrap_or(self.default_remaining);
        let ttl = ttl_seconds
            .unwrap_or(self.default_ttl_seconds)
            .clamp(0, MAX_TTL_SECONDS);
        self.state.remaining = remaining;
        self.state.reset_at = now + TimeDelta::seconds(ttl);
        self.state.last_request = Some(now);
        debug!("quota updated: remaining={remaining} reset_in={ttl}s");
        ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn fresh_tracker_allows_requests() {
        let tracker = QuotaTracker::default();
        assert!(tracker.check_at(at(0)).is_ok());
        assert_eq!(tracker.state().remaining, DEFAULT_REMAINING);
        assert_eq!(tracker.state().last_request, None);
    }

    #[test]
    fn blocks_only_while_exhausted_and_before_reset() {
        let mut tracker = QuotaTracker::default();
        tracker.update_at(Some(0), Some(30), at(0));

        match tracker.check_at(at(10)) {
            Err(LookupError::RateLimitExceeded { wait_seconds }) => {
                assert!((wait_seconds - 20.0).abs() < 1e-9)
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
        // deadline reached
        assert!(tracker.check_at(at(30)).is_ok());

        tracker.update_at(Some(1), Some(30), at(40));
        assert!(tracker.check_at(at(41)).is_ok());

        tracker.update_at(Some(-3), Some(5), at(50));
        assert!(tracker.check_at(at(54)).is_err());
        assert!(tracker.check_at(at(56)).is_ok());
    }

    #[test]
    fn missing_hints_use_configured_defaults() {
        let mut tracker = QuotaTracker::new(10, 90);
        tracker.update_at(None, None, at(0));
        assert_eq!(tracker.state().remaining, 10);
        assert_eq!(tracker.state().reset_at, at(90));
        assert_eq!(tracker.state().last_request, Some(at(0)));
    }

    #[test]
    fn absurd_ttl_is_clamped() {
        let mut tracker = QuotaTracker::default();
        tracker.update_at(Some(0), Some(i64::MAX), at(0));
        assert_eq!(tracker.state().reset_at, at(86_400));
        tracker.update_at(Some(0), Some(-5), at(0));
        assert!(tracker.check_at(at(0)).is_ok());
    }

    #[test]
    fn wait_never_negative() {
        let mut tracker = QuotaTracker::default();
        tracker.update_at(Some(0), Some(1), at(0));
        assert_eq!(tracker.wait_seconds(at(100)), 0.0);
    }
}
