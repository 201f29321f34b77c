//! Bounded retry budget with capped exponential backoff.

use std::time::Duration;

/// Default number of compare-and-set attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 16;

/// Default delay before the second attempt.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(10);

/// Default ceiling for a single backoff delay.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(1);

/// Governs how often and how patiently the updater retries lost races.
///
/// The delay after the `n`th failed attempt is `initial_backoff * 2^(n-1)`,
/// capped at `max_backoff`.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use plugboard_store::RetryPolicy;
///
/// let policy = RetryPolicy::new(5, Duration::from_millis(10), Duration::from_millis(50));
/// assert_eq!(policy.backoff(1), Duration::from_millis(10));
/// assert_eq!(policy.backoff(3), Duration::from_millis(40));
/// assert_eq!(policy.backoff(4), Duration::from_millis(50));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// Creates a policy. A zero attempt budget is raised to one.
    #[must_use]
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff: max_backoff.max(initial_backoff),
        }
    }

    /// Policy that retries without sleeping between attempts.
    #[must_use]
    pub fn without_backoff(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    /// Maximum number of attempts, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the first retry.
    #[must_use]
    pub const fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    /// Upper bound on any single delay.
    #[must_use]
    pub const fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Delay to wait after the given 1-based attempt failed.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1_u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .map_or(self.max_backoff, |delay| delay.min(self.max_backoff))
    }

    /// Returns `true` once `attempt` has used up the budget.
    #[must_use]
    pub const fn is_exhausted(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            DEFAULT_INITIAL_BACKOFF,
            DEFAULT_MAX_BACKOFF,
        )
    }
}
