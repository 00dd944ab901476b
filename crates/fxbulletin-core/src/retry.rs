//! Retry policy: transient classification and backoff schedule.

use std::time::Duration;

/// Exponential delay between attempts: `base * factor^retry`, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    /// Delay before the first retry.
    pub base: Duration,
    /// Multiplier applied for each subsequent retry.
    pub factor: f64,
    /// Upper bound on any single delay.
    pub max: Duration,
}

impl Default for Backoff {
    /// `2^k` seconds before retry `k`.
    fn default() -> Self {
        Self {
            base: Duration::from_secs(2),
            factor: 2.0,
            max: Duration::from_secs(60),
        }
    }
}

impl Backoff {
    /// Delay for the 0-based retry index `attempt`.
    pub fn delay(self, attempt: u32) -> Duration {
        let scale = self.factor.powi(attempt.min(i32::MAX as u32) as i32);
        let seconds = (self.base.as_secs_f64() * scale).min(self.max.as_secs_f64());
        Duration::from_secs_f64(seconds)
    }
}

/// Retry configuration for the bulletin fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first one. `1` disables retrying.
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// Non-5xx statuses that are treated as transient.
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default(),
            retry_on_status: vec![408, 429],
        }
    }
}

impl RetryConfig {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Server errors plus the configured extra statuses are transient.
    pub fn is_transient_status(&self, status: u16) -> bool {
        (500..600).contains(&status) || self.retry_on_status.contains(&status)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        self.backoff.delay(retry.saturating_sub(1))
    }
}
