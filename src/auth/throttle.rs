//! Failed-login throttling keyed by submitted email.
//!
//! Per email the throttle moves through three states: no entry, accumulating
//! failures, and locked (`blocked_until` in the future). A successful login
//! or an elapsed lockout clears the entry entirely.
//!
//! Keying by the submitted email keeps the throttle free of network-layer
//! state, but lets a submitter who knows a victim's address lock that
//! account for the lockout window. Accepted tradeoff for this deployment
//! model; switching the key to IP/device would change observable behavior.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::store::{AttemptRepository, StorageError, ThrottleEntry};

/// Consecutive failures allowed before a lockout window opens.
pub const MAX_ATTEMPTS: u32 = 5;

/// Length of the lockout window, in minutes.
pub const LOCKOUT_MINUTES: i64 = 15;

fn lockout_duration() -> Duration {
    Duration::minutes(LOCKOUT_MINUTES)
}

/// Decision for one login attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed { remaining: u32 },
    Blocked { until: DateTime<Utc> },
}

/// Tracks failed login attempts per email over an injected repository.
pub struct LoginThrottle {
    attempts: Arc<dyn AttemptRepository>,
}

impl LoginThrottle {
    #[must_use]
    pub fn new(attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { attempts }
    }

    /// May an attempt for `email` proceed right now?
    pub fn check(&self, email: &str) -> Result<ThrottleDecision, StorageError> {
        self.check_at(email, Utc::now())
    }

    /// [`check`](Self::check) with an explicit clock, so tests can advance
    /// time past the lockout window.
    pub fn check_at(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<ThrottleDecision, StorageError> {
        let Some(entry) = self.attempts.get(email)? else {
            return Ok(ThrottleDecision::Allowed {
                remaining: MAX_ATTEMPTS,
            });
        };

        if let Some(until) = entry.blocked_until {
            if until > now {
                debug!(email, %until, "login attempt blocked");
                return Ok(ThrottleDecision::Blocked { until });
            }

            // Lockout elapsed: the entry is spent.
            self.attempts.remove(email)?;
            return Ok(ThrottleDecision::Allowed {
                remaining: MAX_ATTEMPTS,
            });
        }

        if entry.failed_attempts >= MAX_ATTEMPTS {
            // Entry from a prior run reached the limit without a recorded
            // window. Reaching MAX always implies one, so open it here.
            let until = now + lockout_duration();
            self.attempts.put(ThrottleEntry {
                blocked_until: Some(until),
                ..entry
            })?;
            return Ok(ThrottleDecision::Blocked { until });
        }

        Ok(ThrottleDecision::Allowed {
            remaining: MAX_ATTEMPTS - entry.failed_attempts,
        })
    }

    /// Count one failed attempt for `email`; opens the lockout window when
    /// the count reaches [`MAX_ATTEMPTS`].
    pub fn record_failure(&self, email: &str) -> Result<(), StorageError> {
        self.record_failure_at(email, Utc::now())
    }

    pub fn record_failure_at(&self, email: &str, now: DateTime<Utc>) -> Result<(), StorageError> {
        let mut entry = self.attempts.get(email)?.unwrap_or_else(|| ThrottleEntry {
            email: email.to_string(),
            failed_attempts: 0,
            last_attempt: now,
            blocked_until: None,
        });

        entry.failed_attempts += 1;
        entry.last_attempt = now;

        if entry.failed_attempts >= MAX_ATTEMPTS {
            let until = now + lockout_duration();
            entry.blocked_until = Some(until);
            warn!(
                email,
                failed_attempts = entry.failed_attempts,
                %until,
                "email locked out after repeated login failures"
            );
        }

        self.attempts.put(entry)
    }

    /// Clear all throttle state for `email`. Idempotent.
    pub fn reset(&self, email: &str) -> Result<(), StorageError> {
        self.attempts.remove(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryAttemptStore;

    const EMAIL: &str = "ann@example.com";

    fn throttle() -> (LoginThrottle, Arc<MemoryAttemptStore>) {
        let store = Arc::new(MemoryAttemptStore::new());
        (LoginThrottle::new(store.clone()), store)
    }

    #[test]
    fn unknown_email_gets_the_full_budget() {
        let (throttle, _) = throttle();

        let decision = throttle.check(EMAIL).expect("check");
        assert_eq!(
            decision,
            ThrottleDecision::Allowed {
                remaining: MAX_ATTEMPTS
            }
        );
    }

    #[test]
    fn each_failure_shrinks_the_remaining_budget() {
        let (throttle, _) = throttle();

        throttle.record_failure(EMAIL).expect("record");
        throttle.record_failure(EMAIL).expect("record");

        let decision = throttle.check(EMAIL).expect("check");
        assert_eq!(
            decision,
            ThrottleDecision::Allowed {
                remaining: MAX_ATTEMPTS - 2
            }
        );
    }

    #[test]
    fn reaching_max_attempts_opens_a_future_lockout_window() {
        let (throttle, store) = throttle();
        let now = Utc::now();

        for _ in 0..MAX_ATTEMPTS {
            throttle.record_failure_at(EMAIL, now).expect("record");
        }

        let entry = store.get(EMAIL).expect("get").expect("entry");
        assert_eq!(entry.failed_attempts, MAX_ATTEMPTS);
        let until = entry.blocked_until.expect("lockout window");
        assert!(until > now);
        assert_eq!(until, now + Duration::minutes(LOCKOUT_MINUTES));

        match throttle.check_at(EMAIL, now).expect("check") {
            ThrottleDecision::Blocked { until: reported } => assert_eq!(reported, until),
            other => panic!("expected Blocked, got {other:?}"),
        }
    }

    #[test]
    fn expired_lockout_clears_the_entry() {
        let (throttle, store) = throttle();
        let now = Utc::now();

        for _ in 0..MAX_ATTEMPTS {
            throttle.record_failure_at(EMAIL, now).expect("record");
        }

        let later = now + Duration::minutes(LOCKOUT_MINUTES) + Duration::seconds(1);
        let decision = throttle.check_at(EMAIL, later).expect("check");
        assert_eq!(
            decision,
            ThrottleDecision::Allowed {
                remaining: MAX_ATTEMPTS
            }
        );
        assert!(store.get(EMAIL).expect("get").is_none());
    }

    #[test]
    fn lockout_boundary_is_exclusive() {
        let (throttle, _) = throttle();
        let now = Utc::now();

        for _ in 0..MAX_ATTEMPTS {
            throttle.record_failure_at(EMAIL, now).expect("record");
        }

        // Exactly at expiry the window is no longer in the future.
        let at_expiry = now + Duration::minutes(LOCKOUT_MINUTES);
        let decision = throttle.check_at(EMAIL, at_expiry).expect("check");
        assert_eq!(
            decision,
            ThrottleDecision::Allowed {
                remaining: MAX_ATTEMPTS
            }
        );
    }

    #[test]
    fn stale_entry_at_max_without_window_gets_one_on_check() {
        let (throttle, store) = throttle();
        let now = Utc::now();

        // State left behind by a prior run that crashed between counting and
        // opening the window.
        store
            .put(ThrottleEntry {
                email: EMAIL.to_string(),
                failed_attempts: MAX_ATTEMPTS,
                last_attempt: now,
                blocked_until: None,
            })
            .expect("put");

        match throttle.check_at(EMAIL, now).expect("check") {
            ThrottleDecision::Blocked { until } => {
                assert_eq!(until, now + Duration::minutes(LOCKOUT_MINUTES));
            }
            other => panic!("expected Blocked, got {other:?}"),
        }

        let entry = store.get(EMAIL).expect("get").expect("entry");
        assert!(entry.blocked_until.is_some());
    }

    #[test]
    fn reset_is_idempotent() {
        let (throttle, store) = throttle();

        throttle.record_failure(EMAIL).expect("record");
        throttle.reset(EMAIL).expect("reset");
        assert!(store.get(EMAIL).expect("get").is_none());

        throttle.reset(EMAIL).expect("reset again");
    }
}
