//! Behavior-driven tests for the rate provider
//!
//! These tests verify WHAT rates a caller receives for a set of requested
//! currencies, and how fetch and parse failures surface.

use fxbulletin_tests::*;
use rust_decimal_macros::dec;

// =============================================================================
// Rate Provider: Filtering and Projection
// =============================================================================

#[tokio::test]
async fn when_some_requested_currencies_are_missing_provider_returns_only_matches() {
    // Given: A bulletin with a single AUD record
    let bulletin = "23 Dec 2025 #248\nCountry|Currency|Amount|Code|Rate\nAustralia|dollar|1|AUD|13.818";
    let h = harness(&test_config(), ScriptedHttpClient::serving(bulletin));

    // When: AUD and EUR are requested
    let rates = h
        .provider
        .get_rates(&currencies(&["AUD", "EUR"]), &CancellationToken::new())
        .await
        .expect("rates");

    // Then: Only AUD comes back, quoted against CZK, and no error is raised
    assert_eq!(rates.len(), 1);
    assert_eq!(rates[0].source().as_str(), "AUD");
    assert_eq!(rates[0].target().as_str(), "CZK");
    assert_eq!(rates[0].value(), dec!(13.818));
}

#[tokio::test]
async fn when_codes_are_lower_case_provider_matches_them_case_insensitively() {
    // Given: The regular daily bulletin
    let h = harness(&test_config(), ScriptedHttpClient::serving(DAILY_BULLETIN));

    // When: Codes are requested in lower case and out of bulletin order
    let rates = h
        .provider
        .get_rates_for_codes(&["usd", "huf", "aud"], &CancellationToken::new())
        .await
        .expect("rates");

    // Then: Rates follow bulletin order and are normalized per unit
    let sources: Vec<_> = rates.iter().map(|rate| rate.source().as_str()).collect();
    assert_eq!(sources, vec!["AUD", "HUF", "USD"]);
    assert_eq!(rates[1].value(), dec!(0.06201));
    assert!(rates.iter().all(|rate| rate.value() > dec!(0)));
}

#[tokio::test]
async fn when_no_requested_currency_is_published_provider_returns_empty_list() {
    // Given: The regular daily bulletin
    let h = harness(&test_config(), ScriptedHttpClient::serving(DAILY_BULLETIN));

    // When: Only unpublished codes are requested
    let rates = h
        .provider
        .get_rates(&currencies(&["XYZ", "KES"]), &CancellationToken::new())
        .await
        .expect("absent codes are not an error");

    // Then: The result is empty
    assert!(rates.is_empty());
}

#[tokio::test]
async fn when_configured_quote_currency_differs_provider_uses_it_as_target() {
    // Given: A provider configured for a different quote currency
    let mut config = test_config();
    config.quote_currency = Currency::parse("eur").expect("valid");
    let h = harness(&config, ScriptedHttpClient::serving(DAILY_BULLETIN));

    // When: Rates are requested
    let rates = h
        .provider
        .get_rates(&currencies(&["USD"]), &CancellationToken::new())
        .await
        .expect("rates");

    // Then: The target is the configured currency
    assert_eq!(rates[0].target().as_str(), "EUR");
}

#[tokio::test]
async fn when_latest_bulletin_is_requested_provider_returns_every_record() {
    let h = harness(&test_config(), ScriptedHttpClient::serving(DAILY_BULLETIN));

    let bulletin = h
        .provider
        .latest_bulletin(&CancellationToken::new())
        .await
        .expect("bulletin");

    assert_eq!(bulletin.sequence, 248);
    assert_eq!(bulletin.records.len(), 6);
}

// =============================================================================
// Rate Provider: Failure Propagation
// =============================================================================

#[tokio::test]
async fn when_bulletin_is_malformed_provider_reports_parse_failure_without_rates() {
    // Given: Upstream serves a bulletin with a broken column header
    let raw = "23 Dec 2025 #248\nCountry;Currency;Amount;Code;Rate\nAustralia|dollar|1|AUD|13.818";
    let h = harness(&test_config(), ScriptedHttpClient::serving(raw));

    // When: Rates are requested
    let error = h
        .provider
        .get_rates(&currencies(&["AUD"]), &CancellationToken::new())
        .await
        .expect_err("malformed bulletin");

    // Then: The parse failure is wrapped, not swallowed
    assert!(matches!(
        error,
        ProviderError::ParseFailed(ParseError::UnexpectedColumns { .. })
    ));
}

#[tokio::test]
async fn when_upstream_returns_not_found_provider_fails_after_single_attempt() {
    // Given: Upstream answers 404
    let h = harness(&test_config(), ScriptedHttpClient::new([status(404)]));

    // When: Rates are requested
    let error = h
        .provider
        .get_rates(&currencies(&["AUD"]), &CancellationToken::new())
        .await
        .expect_err("not found");

    // Then: The failure is non-transient and was not retried
    assert!(matches!(
        error,
        ProviderError::FetchFailed(FetchError::NonTransient {
            status: Some(404),
            ..
        })
    ));
    assert_eq!(h.client.calls(), 1);
}

#[tokio::test]
async fn when_a_code_is_malformed_provider_rejects_the_request_before_fetching() {
    let h = harness(&test_config(), ScriptedHttpClient::serving(DAILY_BULLETIN));

    let error = h
        .provider
        .get_rates_for_codes(&["USD", "EURO"], &CancellationToken::new())
        .await
        .expect_err("invalid code");

    assert!(matches!(error, ProviderError::Validation(_)));
    assert_eq!(h.client.calls(), 0);
}
