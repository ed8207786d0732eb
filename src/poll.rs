//! Bounded polling
//!
//! Converts "eventually visible" conditions into match results: probe up to
//! `attempts` times, sleep a randomized interval between attempts, return
//! the first hit immediately. Exhausting the policy is the caller's implicit
//! timeout; it is a value, not an error, and the caller decides whether it
//! is fatal in context.

use rand::Rng;
use std::time::Duration;

use crate::vision::MatchResult;

/// Attempt ceiling and inter-attempt sleep range for one polling call.
///
/// Transient: constructed per call, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    interval_min_ms: u64,
    interval_max_ms: u64,
}

impl RetryPolicy {
    /// Panics if `attempts` is zero or the interval range is inverted.
    pub const fn new(attempts: u32, interval_min_ms: u64, interval_max_ms: u64) -> Self {
        assert!(attempts >= 1, "a retry policy needs at least one attempt");
        assert!(
            interval_min_ms <= interval_max_ms,
            "inverted retry interval"
        );
        Self {
            attempts,
            interval_min_ms,
            interval_max_ms,
        }
    }

    /// Single synchronous probe, no sleeping. For non-blocking checks.
    pub fn probe() -> Self {
        Self::new(1, 0, 0)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn sleep_between_attempts(&self) {
        if self.interval_max_ms == 0 {
            return;
        }
        let ms = rand::thread_rng().gen_range(self.interval_min_ms..=self.interval_max_ms);
        std::thread::sleep(Duration::from_millis(ms));
    }
}

/// Poll `probe` until it reports a match or the policy is exhausted.
///
/// The probe runs at most `attempts` times and never again after a hit.
pub fn poll_until<F>(mut probe: F, policy: &RetryPolicy) -> MatchResult
where
    F: FnMut() -> MatchResult,
{
    for attempt in 1..=policy.attempts {
        let result = probe();
        if result.is_found() {
            return result;
        }
        log::debug!("poll attempt {attempt}/{} found nothing", policy.attempts);
        if attempt < policy.attempts {
            policy.sleep_between_attempts();
        }
    }
    MatchResult::NotFound
}

/// Boolean-condition variant used where there is no coordinate to carry.
pub fn poll_until_true<F>(mut condition: F, policy: &RetryPolicy) -> bool
where
    F: FnMut() -> bool,
{
    for attempt in 1..=policy.attempts {
        if condition() {
            return true;
        }
        if attempt < policy.attempts {
            policy.sleep_between_attempts();
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::Region;

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, 0, 0)
    }

    #[test]
    #[should_panic]
    fn test_zero_attempts_is_invalid() {
        RetryPolicy::new(0, 10, 20);
    }

    #[test]
    fn test_early_exit_on_first_hit() {
        let mut calls = 0;
        let result = poll_until(
            || {
                calls += 1;
                MatchResult::Found(Region::new(1, 2, 3, 4))
            },
            &fast(5),
        );
        assert!(result.is_found());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_at_most_k_probes() {
        let mut calls = 0;
        let result = poll_until(
            || {
                calls += 1;
                MatchResult::NotFound
            },
            &fast(4),
        );
        assert_eq!(result, MatchResult::NotFound);
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_success_mid_way_stops_probing() {
        let mut calls = 0;
        let result = poll_until(
            || {
                calls += 1;
                if calls == 3 {
                    MatchResult::Found(Region::new(0, 0, 1, 1))
                } else {
                    MatchResult::NotFound
                }
            },
            &fast(10),
        );
        assert!(result.is_found());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_probe_policy_is_one_shot() {
        let mut calls = 0;
        poll_until(
            || {
                calls += 1;
                MatchResult::NotFound
            },
            &RetryPolicy::probe(),
        );
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_bool_variant() {
        let mut calls = 0;
        assert!(poll_until_true(
            || {
                calls += 1;
                calls == 2
            },
            &fast(3)
        ));
        assert_eq!(calls, 2);
    }
}
