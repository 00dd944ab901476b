//! Bulletin retrieval with composable resilience layers.
//!
//! Each layer implements [`BulletinFetch`] and wraps another one:
//!
//! ```text
//! TimeoutLayer            bounds the whole operation
//!   └─ RetryLayer         re-attempts transient failures with backoff
//!        └─ CircuitBreakerLayer   admits or rejects each attempt
//!             └─ TransportFetch   one HTTP GET, classified
//! ```
//!
//! [`ResilientFetcher`] assembles the stack from a [`ProviderConfig`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::circuit_breaker::CircuitBreaker;
use crate::config::ProviderConfig;
use crate::http_client::{HttpClient, HttpRequest};
use crate::retry::RetryConfig;
use crate::FetchError;

const BODY_PREVIEW_CHARS: usize = 200;

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<String, FetchError>> + Send + 'a>>;

/// Source of raw bulletin text.
pub trait BulletinFetch: Send + Sync {
    fn fetch<'a>(&'a self, cancel: &'a CancellationToken) -> FetchFuture<'a>;
}

impl<T: BulletinFetch + ?Sized> BulletinFetch for Arc<T> {
    fn fetch<'a>(&'a self, cancel: &'a CancellationToken) -> FetchFuture<'a> {
        (**self).fetch(cancel)
    }
}

/// One GET of the bulletin URL, with the outcome classified for the outer layers.
pub struct TransportFetch {
    http_client: Arc<dyn HttpClient>,
    url: String,
    attempt_timeout: Duration,
    retry: RetryConfig,
}

impl TransportFetch {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        url: impl Into<String>,
        attempt_timeout: Duration,
        retry: RetryConfig,
    ) -> Self {
        Self {
            http_client,
            url: url.into(),
            attempt_timeout,
            retry,
        }
    }
}

impl BulletinFetch for TransportFetch {
    fn fetch<'a>(&'a self, cancel: &'a CancellationToken) -> FetchFuture<'a> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }

            tracing::info!(url = %self.url, "fetching daily bulletin");
            let request = HttpRequest::get(&self.url)
                .with_header("accept", "text/plain")
                .with_timeout(self.attempt_timeout);

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                outcome = self.http_client.execute(request) => outcome,
            };

            if let Err(error) = &outcome {
                tracing::debug!(kind = ?error.kind(), retryable = error.retryable(), error = %error, "bulletin transport error");
            }

            match outcome {
                Err(error) if error.retryable() => {
                    Err(FetchError::transient(None, error.message()))
                }
                Err(error) => Err(FetchError::non_transient(None, error.message())),
                Ok(response) if response.is_success() => {
                    tracing::info!(bytes = response.body.len(), "retrieved daily bulletin");
                    tracing::debug!(
                        preview = %response.body.chars().take(BODY_PREVIEW_CHARS).collect::<String>(),
                        "bulletin body preview"
                    );
                    Ok(response.body)
                }
                Ok(response) if self.retry.is_transient_status(response.status) => {
                    Err(FetchError::transient(
                        Some(response.status),
                        format!("upstream returned status {}", response.status),
                    ))
                }
                Ok(response) => Err(FetchError::non_transient(
                    Some(response.status),
                    format!("upstream returned status {}", response.status),
                )),
            }
        })
    }
}

/// Consults a shared [`CircuitBreaker`] before every attempt.
///
/// Transient failures count against the breaker. Any answer from upstream,
/// including a non-transient status, counts as success. Cancelled or aborted
/// attempts are released without being counted.
pub struct CircuitBreakerLayer<F> {
    inner: F,
    breaker: Arc<CircuitBreaker>,
}

impl<F> CircuitBreakerLayer<F> {
    pub fn new(inner: F, breaker: Arc<CircuitBreaker>) -> Self {
        Self { inner, breaker }
    }
}

impl<F: BulletinFetch> BulletinFetch for CircuitBreakerLayer<F> {
    fn fetch<'a>(&'a self, cancel: &'a CancellationToken) -> FetchFuture<'a> {
        Box::pin(async move {
            let Some(permit) = self.breaker.acquire() else {
                tracing::warn!("circuit breaker open, skipping bulletin fetch");
                return Err(FetchError::CircuitOpen);
            };

            let result = self.inner.fetch(cancel).await;
            match &result {
                Ok(_) => permit.success(),
                Err(error) if error.is_transient() => permit.failure(),
                Err(error) if error.status().is_some() => permit.success(),
                Err(_) => drop(permit),
            }
            result
        })
    }
}

/// Re-attempts [`FetchError::Transient`] failures with the configured backoff.
pub struct RetryLayer<F> {
    inner: F,
    config: RetryConfig,
}

impl<F> RetryLayer<F> {
    pub fn new(inner: F, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

impl<F: BulletinFetch> BulletinFetch for RetryLayer<F> {
    fn fetch<'a>(&'a self, cancel: &'a CancellationToken) -> FetchFuture<'a> {
        Box::pin(async move {
            let max_attempts = self.config.max_attempts.max(1);
            let mut attempt = 1;

            loop {
                let (status, cause) = match self.inner.fetch(cancel).await {
                    Err(FetchError::Transient { status, cause }) => (status, cause),
                    other => return other,
                };

                if attempt >= max_attempts {
                    tracing::error!(attempts = attempt, reason = %cause, "bulletin fetch retries exhausted");
                    return Err(FetchError::TransientExhausted {
                        attempts: attempt,
                        last: cause,
                    });
                }

                let delay = self.config.delay_before_retry(attempt);
                tracing::warn!(
                    retry = attempt,
                    max_attempts,
                    delay_secs = delay.as_secs_f64(),
                    status,
                    reason = %cause,
                    "retrying bulletin fetch"
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
                attempt += 1;
            }
        })
    }
}

/// Bounds the wrapped fetch, retries and backoff included.
pub struct TimeoutLayer<F> {
    inner: F,
    timeout: Duration,
}

impl<F> TimeoutLayer<F> {
    pub fn new(inner: F, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl<F: BulletinFetch> BulletinFetch for TimeoutLayer<F> {
    fn fetch<'a>(&'a self, cancel: &'a CancellationToken) -> FetchFuture<'a> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, self.inner.fetch(cancel)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::error!(
                        timeout_ms = self.timeout.as_millis() as u64,
                        "bulletin fetch timed out"
                    );
                    Err(FetchError::Timeout {
                        after: self.timeout,
                    })
                }
            }
        })
    }
}

type Pipeline = TimeoutLayer<RetryLayer<CircuitBreakerLayer<TransportFetch>>>;

/// Transport wrapped in timeout, retry and circuit breaker, in that order.
pub struct ResilientFetcher {
    pipeline: Pipeline,
    breaker: Arc<CircuitBreaker>,
}

impl ResilientFetcher {
    pub fn new(config: &ProviderConfig, http_client: Arc<dyn HttpClient>) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(config.circuit_breaker));
        Self::with_breaker(config, http_client, breaker)
    }

    /// Build around an existing breaker, e.g. one shared with other fetchers
    /// of the same upstream.
    pub fn with_breaker(
        config: &ProviderConfig,
        http_client: Arc<dyn HttpClient>,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        let transport = TransportFetch::new(
            http_client,
            config.daily_rates_url(),
            config.attempt_timeout,
            config.retry.clone(),
        );
        let pipeline = TimeoutLayer::new(
            RetryLayer::new(
                CircuitBreakerLayer::new(transport, Arc::clone(&breaker)),
                config.retry.clone(),
            ),
            config.timeout,
        );

        Self { pipeline, breaker }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

impl BulletinFetch for ResilientFetcher {
    fn fetch<'a>(&'a self, cancel: &'a CancellationToken) -> FetchFuture<'a> {
        self.pipeline.fetch(cancel)
    }
}
