//! # FX Bulletin Core
//!
//! Retrieval and parsing of the daily pipe-separated exchange-rate bulletin.
//!
//! ## Overview
//!
//! - **Strict parser** turning raw bulletin text into typed records
//! - **Resilient fetcher** composing timeout, retry and circuit breaker around one GET
//! - **Rate provider** filtering the bulletin down to the requested currencies
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`circuit_breaker`] | Shared closed/open/half-open breaker |
//! | [`config`] | Provider configuration, defaults and environment overrides |
//! | [`domain`] | Currency, ExchangeRate, BulletinRecord, DailyBulletin |
//! | [`error`] | Error taxonomy per stage |
//! | [`fetcher`] | Fetch trait and resilience layers |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`parser`] | Bulletin text parser |
//! | [`provider`] | Fetch, parse, filter, project |
//! | [`retry`] | Backoff schedule and transient classification |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fxbulletin_core::{ProviderConfig, RateProvider};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = RateProvider::from_config(&ProviderConfig::default())?;
//!     let rates = provider
//!         .get_rates_for_codes(&["USD", "EUR"], &CancellationToken::new())
//!         .await?;
//!
//!     for rate in rates {
//!         println!("{rate}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  RateProvider   │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ TimeoutLayer    │     │                  │
//! │  RetryLayer     │────▶│ Circuit Breaker  │
//! │   BreakerLayer  │     │                  │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ TransportFetch  │────▶│ HTTP Client      │
//! └────────┬────────┘     │ (reqwest/script) │
//!          │              └──────────────────┘
//!          ▼
//! ┌─────────────────┐
//! │ BulletinParser  │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Each stage has its own error enum; [`ProviderError`] wraps them so callers
//! can tell a network failure from a malformed bulletin:
//!
//! ```rust
//! use fxbulletin_core::{FetchError, ProviderError};
//!
//! fn describe(error: &ProviderError) -> &'static str {
//!     match error {
//!         ProviderError::FetchFailed(FetchError::CircuitOpen) => "upstream cooling down",
//!         ProviderError::FetchFailed(_) => "upstream unavailable",
//!         ProviderError::ParseFailed(_) => "bulletin format changed",
//!         ProviderError::Validation(_) => "bad currency code",
//!     }
//! }
//! ```

pub mod circuit_breaker;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod parser;
pub mod provider;
pub mod retry;

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitPermit, CircuitState};

// Configuration
pub use config::ProviderConfig;

// Domain models
pub use domain::{BulletinRecord, Currency, DailyBulletin, ExchangeRate, COLUMN_HEADER};

// Error types
pub use error::{ConfigError, FetchError, ParseError, ProviderError, ValidationError};

// Fetch pipeline
pub use fetcher::{
    BulletinFetch, CircuitBreakerLayer, FetchFuture, ResilientFetcher, RetryLayer, TimeoutLayer,
    TransportFetch,
};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient,
};

// Parsing
pub use parser::{parse_bulletin, BulletinParser};

// Provider
pub use provider::RateProvider;

// Retry logic
pub use retry::{Backoff, RetryConfig};
