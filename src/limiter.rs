//! Per-connection message rate limiting
//!
//! Fixed-window approximation of a sliding window: the first message opens
//! a 60-second window, messages within it count against a budget of 20, and
//! a message after the window expires opens a fresh one. Denied messages do
//! not consume budget or extend the window, so a blocked sender recovers as
//! soon as the original window ages out. Bursts across a window boundary are
//! accepted behavior.
//!
//! Applies to chat messages only; typing indicators, reactions, and edits
//! are never rate limited.

use std::time::{Duration, Instant};

/// Window length for the message budget
pub const MESSAGE_WINDOW: Duration = Duration::from_secs(60);

/// Messages allowed per window
pub const MESSAGE_BUDGET: u32 = 20;

/// Fixed-window message budget for one connection
///
/// Embedded in each registry entry; all mutation happens on the server
/// actor task, so no synchronization is needed.
#[derive(Debug, Default)]
pub struct RateLimiter {
    /// Start of the current window (None until the first message)
    window_start: Option<Instant>,
    /// Messages counted in the current window
    count: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the budget at `now` and consume one slot if allowed
    ///
    /// Returns false when the budget is exhausted; a denied call leaves the
    /// window untouched.
    pub fn check_and_consume(&mut self, now: Instant) -> bool {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            self.count = 1;
            return true;
        };

        if now.duration_since(start) > MESSAGE_WINDOW {
            self.window_start = Some(now);
            self.count = 1;
            return true;
        }

        if self.count < MESSAGE_BUDGET {
            self.count += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_allowed() {
        let mut limiter = RateLimiter::new();
        assert!(limiter.check_and_consume(Instant::now()));
    }

    #[test]
    fn test_budget_exhausts_at_twenty() {
        let mut limiter = RateLimiter::new();
        let now = Instant::now();

        for _ in 0..MESSAGE_BUDGET {
            assert!(limiter.check_and_consume(now));
        }
        // 21st message in the same window is denied
        assert!(!limiter.check_and_consume(now));
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let mut limiter = RateLimiter::new();
        let start = Instant::now();

        for _ in 0..MESSAGE_BUDGET {
            assert!(limiter.check_and_consume(start));
        }
        assert!(!limiter.check_and_consume(start));

        let later = start + MESSAGE_WINDOW + Duration::from_secs(1);
        assert!(limiter.check_and_consume(later));
        // Fresh window, fresh budget
        assert!(limiter.check_and_consume(later));
    }

    #[test]
    fn test_denial_does_not_extend_window() {
        let mut limiter = RateLimiter::new();
        let start = Instant::now();

        for _ in 0..MESSAGE_BUDGET {
            assert!(limiter.check_and_consume(start));
        }

        // Denied just before expiry; the window must still age out from
        // `start`, not from the denial.
        let near_end = start + MESSAGE_WINDOW - Duration::from_secs(1);
        assert!(!limiter.check_and_consume(near_end));

        let after = start + MESSAGE_WINDOW + Duration::from_secs(1);
        assert!(limiter.check_and_consume(after));
    }

    #[test]
    fn test_exact_boundary_stays_in_window() {
        let mut limiter = RateLimiter::new();
        let start = Instant::now();

        for _ in 0..MESSAGE_BUDGET {
            assert!(limiter.check_and_consume(start));
        }
        // Exactly 60s is not yet past the window
        assert!(!limiter.check_and_consume(start + MESSAGE_WINDOW));
    }
}
