use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

/// Runtime circuit state for upstream bulletin calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Circuit breaker thresholds and timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures that open the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a trial call is admitted.
    pub open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct CircuitInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_in_flight: bool,
}

impl Default for CircuitInner {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            trial_in_flight: false,
        }
    }
}

/// Thread-safe circuit breaker shared by every fetch of one upstream.
///
/// All transitions happen under a single lock. While half-open, exactly one
/// trial call is admitted; everything else is rejected until it settles.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<CircuitInner>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(CircuitInner::default()),
        }
    }

    pub const fn config(&self) -> CircuitBreakerConfig {
        self.config
    }

    fn lock(&self) -> MutexGuard<'_, CircuitInner> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("circuit breaker lock was poisoned, recovering state");
            poisoned.into_inner()
        })
    }

    /// Admit or reject a call. `Some(true)` means the call is the half-open trial.
    fn admit(&self) -> Option<bool> {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => Some(false),
            CircuitState::HalfOpen => {
                if inner.trial_in_flight {
                    None
                } else {
                    inner.trial_in_flight = true;
                    Some(true)
                }
            }
            CircuitState::Open => {
                let cool_down_elapsed = inner
                    .opened_at
                    .map(|opened_at| opened_at.elapsed() >= self.config.open_timeout)
                    .unwrap_or(false);

                if cool_down_elapsed {
                    tracing::info!("circuit breaker half-open, admitting trial call");
                    inner.state = CircuitState::HalfOpen;
                    inner.opened_at = None;
                    inner.trial_in_flight = true;
                    Some(true)
                } else {
                    None
                }
            }
        }
    }

    /// Admit a call and hand back a permit that settles its outcome.
    pub fn acquire(&self) -> Option<CircuitPermit<'_>> {
        self.admit().map(|is_trial| CircuitPermit {
            breaker: self,
            is_trial,
            settled: false,
        })
    }

    /// Record a success observed outside a permit, e.g. a call admitted while closed.
    pub fn record_success(&self) {
        self.settle_success(false);
    }

    /// Record a failure observed outside a permit.
    pub fn record_failure(&self) {
        self.settle_failure(false);
    }

    fn settle_success(&self, is_trial: bool) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => inner.consecutive_failures = 0,
            // Only the trial decides how a half-open circuit settles; a late
            // success from before the circuit opened changes nothing.
            CircuitState::HalfOpen if is_trial => {
                tracing::info!("circuit breaker reset");
                inner.state = CircuitState::Closed;
                inner.consecutive_failures = 0;
                inner.opened_at = None;
                inner.trial_in_flight = false;
            }
            CircuitState::HalfOpen | CircuitState::Open => {}
        }
    }

    fn settle_failure(&self, is_trial: bool) {
        let mut inner = self.lock();
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);

        let should_open = match inner.state {
            CircuitState::HalfOpen => is_trial,
            CircuitState::Closed => inner.consecutive_failures >= self.config.failure_threshold,
            CircuitState::Open => false,
        };

        if should_open {
            tracing::error!(
                consecutive_failures = inner.consecutive_failures,
                open_for_secs = self.config.open_timeout.as_secs_f64(),
                "circuit breaker opened"
            );
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            inner.trial_in_flight = false;
        }
    }

    /// Settle an admitted call without counting it either way, e.g. when the
    /// caller cancelled it. A released trial frees the half-open slot.
    fn release(&self, is_trial: bool) {
        let mut inner = self.lock();
        if is_trial && inner.state == CircuitState::HalfOpen {
            inner.trial_in_flight = false;
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }
}

/// Admission handed out by [`CircuitBreaker::acquire`].
///
/// Dropping it unsettled releases the call without recording an outcome.
#[derive(Debug)]
#[must_use = "an unsettled permit is released without recording an outcome"]
pub struct CircuitPermit<'a> {
    breaker: &'a CircuitBreaker,
    is_trial: bool,
    settled: bool,
}

impl CircuitPermit<'_> {
    /// Whether this permit is the single half-open trial.
    pub const fn is_trial(&self) -> bool {
        self.is_trial
    }

    pub fn success(mut self) {
        self.settled = true;
        self.breaker.settle_success(self.is_trial);
    }

    pub fn failure(mut self) {
        self.settled = true;
        self.breaker.settle_failure(self.is_trial);
    }
}

impl Drop for CircuitPermit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.release(self.is_trial);
        }
    }
}
