//! Behavior-driven tests for fetch resilience
//!
//! These tests verify HOW the provider behaves when the upstream is slow,
//! flaky or down: retry timing, circuit breaker transitions, timeouts and
//! caller cancellation. The tokio clock is paused so waits are exact.

use std::time::Duration;

use fxbulletin_tests::*;
use tokio::time::Instant;
use tracing::Level;

fn breaker_config(failure_threshold: u32, open_secs: u64) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold,
        open_timeout: Duration::from_secs(open_secs),
    }
}

// =============================================================================
// Resilience: Retry
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_upstream_fails_twice_then_recovers_provider_returns_rates() {
    // Given: Two 503 responses followed by the bulletin
    let h = harness(
        &test_config(),
        ScriptedHttpClient::new([status(503), status(503), Ok(HttpResponse::ok(DAILY_BULLETIN))]),
    );
    let logs = LogCapture::default();
    let _guard = logs.install();
    let started = Instant::now();

    // When: Rates are requested with the default three attempts
    let rates = h
        .provider
        .get_rates(&currencies(&["EUR"]), &CancellationToken::new())
        .await
        .expect("third attempt succeeds");

    // Then: Rates arrive after 2s + 4s of backoff and three calls
    assert_eq!(rates.len(), 1);
    assert_eq!(h.client.calls(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(6));
    assert_eq!(h.fetcher.breaker().state(), CircuitState::Closed);

    // And: Each of the two retries was logged as a warning
    assert_eq!(logs.count(Level::WARN, "retrying bulletin fetch"), 2);
    assert_eq!(logs.count(Level::ERROR, "bulletin fetch retries exhausted"), 0);
}

#[tokio::test(start_paused = true)]
async fn when_every_attempt_is_transient_provider_reports_exhaustion() {
    // Given: Upstream keeps timing out at the network level
    let h = harness(
        &test_config(),
        ScriptedHttpClient::new([Err(HttpError::new(HttpErrorKind::Timeout, "read timed out"))]),
    );

    // When: Rates are requested
    let error = h
        .provider
        .get_rates(&currencies(&["EUR"]), &CancellationToken::new())
        .await
        .expect_err("every attempt fails");

    // Then: The last cause is reported with the attempt count
    assert_eq!(
        error,
        ProviderError::FetchFailed(FetchError::TransientExhausted {
            attempts: 3,
            last: String::from("read timed out"),
        })
    );
    assert_eq!(h.client.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn when_rate_limited_provider_retries() {
    let h = harness(
        &test_config(),
        ScriptedHttpClient::new([status(429), Ok(HttpResponse::ok(DAILY_BULLETIN))]),
    );

    let rates = h
        .provider
        .get_rates(&currencies(&["USD"]), &CancellationToken::new())
        .await
        .expect("second attempt succeeds");

    assert_eq!(rates.len(), 1);
    assert_eq!(h.client.calls(), 2);
}

// =============================================================================
// Resilience: Circuit Breaker
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_threshold_is_reached_breaker_rejects_without_network_call() {
    // Given: Single-attempt fetches and a breaker opening after 5 failures
    let mut config = test_config();
    config.retry = RetryConfig::no_retry();
    config.circuit_breaker = breaker_config(5, 30);
    let h = harness(&config, ScriptedHttpClient::new([status(503)]));
    let cancel = CancellationToken::new();
    let requested = currencies(&["AUD"]);

    // When: Five calls fail transiently
    for _ in 0..5 {
        h.provider
            .get_rates(&requested, &cancel)
            .await
            .expect_err("transient failure");
    }

    // Then: The sixth call fails fast without reaching the network
    let error = h
        .provider
        .get_rates(&requested, &cancel)
        .await
        .expect_err("breaker open");
    assert_eq!(error, ProviderError::FetchFailed(FetchError::CircuitOpen));
    assert_eq!(h.client.calls(), 5);
}

#[tokio::test(start_paused = true)]
async fn when_cool_down_elapses_successful_trial_closes_breaker() {
    // Given: A breaker opened by one failure, upstream recovered afterwards
    let mut config = test_config();
    config.retry = RetryConfig::no_retry();
    config.circuit_breaker = breaker_config(1, 30);
    let h = harness(
        &config,
        ScriptedHttpClient::new([status(500), Ok(HttpResponse::ok(DAILY_BULLETIN))]),
    );
    let cancel = CancellationToken::new();
    let requested = currencies(&["AUD"]);
    let logs = LogCapture::default();
    let _guard = logs.install();
    h.provider
        .get_rates(&requested, &cancel)
        .await
        .expect_err("first call fails");

    // When: Just before the cool-down ends, and then once it has ended
    tokio::time::advance(Duration::from_millis(29_999)).await;
    let still_open = h.provider.get_rates(&requested, &cancel).await;
    tokio::time::advance(Duration::from_millis(1)).await;
    let trial = h.provider.get_rates(&requested, &cancel).await;

    // Then: The first is rejected, the trial succeeds and closes the breaker
    assert_eq!(
        still_open.expect_err("still cooling down"),
        ProviderError::FetchFailed(FetchError::CircuitOpen)
    );
    assert_eq!(trial.expect("trial succeeds").len(), 1);
    assert_eq!(h.fetcher.breaker().state(), CircuitState::Closed);
    assert_eq!(h.client.calls(), 2);

    // And: Opening, the half-open trial and the reset were each logged once
    assert_eq!(logs.count(Level::ERROR, "circuit breaker opened"), 1);
    assert_eq!(
        logs.count(Level::INFO, "circuit breaker half-open, admitting trial call"),
        1
    );
    assert_eq!(logs.count(Level::INFO, "circuit breaker reset"), 1);
}

#[tokio::test(start_paused = true)]
async fn when_trial_call_fails_breaker_reopens_for_another_cool_down() {
    // Given: An open breaker and an upstream that is still down
    let mut config = test_config();
    config.retry = RetryConfig::no_retry();
    config.circuit_breaker = breaker_config(1, 30);
    let h = harness(&config, ScriptedHttpClient::new([status(502)]));
    let cancel = CancellationToken::new();
    let requested = currencies(&["AUD"]);
    h.provider
        .get_rates(&requested, &cancel)
        .await
        .expect_err("opens breaker");

    // When: The trial after the cool-down also fails
    tokio::time::advance(Duration::from_secs(30)).await;
    h.provider
        .get_rates(&requested, &cancel)
        .await
        .expect_err("trial fails");

    // Then: The breaker is open again and rejects the next call
    assert_eq!(h.fetcher.breaker().state(), CircuitState::Open);
    let error = h
        .provider
        .get_rates(&requested, &cancel)
        .await
        .expect_err("reopened");
    assert_eq!(error, ProviderError::FetchFailed(FetchError::CircuitOpen));
    assert_eq!(h.client.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn when_upstream_answers_with_client_error_breaker_does_not_count_it() {
    let mut config = test_config();
    config.circuit_breaker = breaker_config(1, 30);
    let h = harness(&config, ScriptedHttpClient::new([status(404)]));

    h.provider
        .get_rates(&currencies(&["AUD"]), &CancellationToken::new())
        .await
        .expect_err("not found");

    assert_eq!(h.fetcher.breaker().state(), CircuitState::Closed);
}

// =============================================================================
// Resilience: Timeout and Cancellation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_upstream_hangs_provider_times_out_without_tripping_breaker() {
    // Given: A 5s overall budget and an upstream that takes a minute
    let mut config = test_config();
    config.timeout = Duration::from_secs(5);
    config.circuit_breaker = breaker_config(1, 30);
    let h = harness(
        &config,
        ScriptedHttpClient::serving(DAILY_BULLETIN).with_latency(Duration::from_secs(60)),
    );
    let started = Instant::now();

    // When: Rates are requested
    let error = h
        .provider
        .get_rates(&currencies(&["AUD"]), &CancellationToken::new())
        .await
        .expect_err("too slow");

    // Then: The timeout fires at the budget and the breaker stays closed
    assert_eq!(
        error,
        ProviderError::FetchFailed(FetchError::Timeout {
            after: Duration::from_secs(5)
        })
    );
    assert_eq!(started.elapsed(), Duration::from_secs(5));
    assert_eq!(h.fetcher.breaker().state(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn when_caller_cancels_during_backoff_provider_stops_promptly() {
    // Given: Upstream keeps failing, caller cancels after 3s
    let h = harness(&test_config(), ScriptedHttpClient::new([status(503)]));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        trigger.cancel();
    });
    let started = Instant::now();

    // When: Rates are requested
    let error = h
        .provider
        .get_rates(&currencies(&["AUD"]), &cancel)
        .await
        .expect_err("cancelled");

    // Then: The second backoff is abandoned at the moment of cancellation
    assert_eq!(error, ProviderError::FetchFailed(FetchError::Cancelled));
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!(h.client.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn when_concurrent_callers_share_a_provider_breaker_counts_all_failures() {
    // Given: Single-attempt fetches, threshold 4, slow failing upstream
    let mut config = test_config();
    config.retry = RetryConfig::no_retry();
    config.circuit_breaker = breaker_config(4, 30);
    let h = Arc::new(harness(
        &config,
        ScriptedHttpClient::new([status(503)]).with_latency(Duration::from_millis(100)),
    ));

    // When: Four callers fail at the same time
    let mut tasks = Vec::new();
    for _ in 0..4 {
        let h = Arc::clone(&h);
        tasks.push(tokio::spawn(async move {
            h.provider
                .get_rates(&currencies(&["AUD"]), &CancellationToken::new())
                .await
        }));
    }
    for task in tasks {
        task.await.expect("task completes").expect_err("transient");
    }

    // Then: The breaker saw every failure and is open
    assert_eq!(h.fetcher.breaker().state(), CircuitState::Open);
    assert_eq!(h.fetcher.breaker().consecutive_failures(), 4);
}
