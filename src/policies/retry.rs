//! # Retry policy for failed ad sessions.
//!
//! [`RetryPolicy`] controls how long the controller waits before re-requesting
//! after a failure, and whether it gives up. It is parameterized by:
//! - [`RetryPolicy::delay`] the delay before the first retry;
//! - [`RetryPolicy::factor`] the multiplicative growth factor (`1.0` = fixed delay);
//! - [`RetryPolicy::max_delay`] the maximum delay cap;
//! - [`RetryPolicy::max_attempts`] an optional bound on consecutive failures;
//! - [`RetryPolicy::jitter`] optional randomization.
//!
//! The default is a fixed 2s delay, retried indefinitely.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use adcycle::RetryPolicy;
//!
//! let policy = RetryPolicy::fixed(Duration::from_secs(2)).with_max_attempts(3);
//!
//! assert_eq!(policy.next(1), Some(Duration::from_secs(2)));
//! assert_eq!(policy.next(3), Some(Duration::from_secs(2)));
//! assert_eq!(policy.next(4), None);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::policies::jitter::JitterPolicy;

/// Retry policy applied after every session failure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
    /// Maximum delay cap.
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
    /// Multiplicative growth factor per consecutive failure.
    pub factor: f64,
    /// Maximum consecutive failures before the controller stops retrying (`None` = unbounded).
    pub max_attempts: Option<u32>,
    /// Randomization applied to each delay.
    pub jitter: JitterPolicy,
}

impl Default for RetryPolicy {
    /// Returns a policy with:
    /// - `delay = 2s`;
    /// - `factor = 1.0` (fixed delay);
    /// - `max_delay = 60s`;
    /// - `max_attempts = None` (retry forever);
    /// - `jitter = None`.
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            factor: 1.0,
            max_attempts: None,
            jitter: JitterPolicy::None,
        }
    }
}

impl RetryPolicy {
    /// Fixed-delay, unbounded policy.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_delay: delay.max(Self::default().max_delay),
            ..Self::default()
        }
    }

    /// Bounds the number of consecutive failures that are retried.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Returns `true` if failure number `attempt` (1-based) may be retried.
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt <= max)
    }

    /// Delay before retrying failure number `attempt` (1-based).
    ///
    /// The base is `delay × factor^(attempt-1)`, clamped to [`RetryPolicy::max_delay`],
    /// then jitter is applied. Each attempt derives its base independently.
    ///
    /// The cap only limits growth: it never shortens the configured `delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let cap = self.max_delay.max(self.delay);
        let secs = self.delay.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > cap.as_secs_f64() {
            cap
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }

    /// Delay before retrying failure number `attempt`, or `None` once the bound is reached.
    pub fn next(&self, attempt: u32) -> Option<Duration> {
        self.allows(attempt).then(|| self.delay_for(attempt))
    }
}
