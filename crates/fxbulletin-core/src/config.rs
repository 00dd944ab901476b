//! Provider configuration.
//!
//! Values arrive already resolved; [`ProviderConfig::from_env`] layers
//! `FXBULLETIN_*` environment variables over the defaults.

use std::time::Duration;

use reqwest::header::HeaderValue;
use reqwest::Url;

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::retry::RetryConfig;
use crate::{ConfigError, Currency};

pub const DEFAULT_BASE_URL: &str = "https://www.cnb.cz";
pub const DEFAULT_DAILY_RATES_PATH: &str = "/en/financial-markets/foreign-exchange-market/central-bank-exchange-rate-fixing/central-bank-exchange-rate-fixing/daily.txt";
pub const DEFAULT_QUOTE_CURRENCY: &str = "CZK";

const ENV_BASE_URL: &str = "FXBULLETIN_BASE_URL";
const ENV_DAILY_RATES_PATH: &str = "FXBULLETIN_DAILY_RATES_PATH";
const ENV_USER_AGENT: &str = "FXBULLETIN_USER_AGENT";
const ENV_TIMEOUT_SECS: &str = "FXBULLETIN_TIMEOUT_SECS";
const ENV_ATTEMPT_TIMEOUT_SECS: &str = "FXBULLETIN_ATTEMPT_TIMEOUT_SECS";
const ENV_RETRY_COUNT: &str = "FXBULLETIN_RETRY_COUNT";
const ENV_BREAKER_THRESHOLD: &str = "FXBULLETIN_BREAKER_THRESHOLD";
const ENV_BREAKER_COOLDOWN_SECS: &str = "FXBULLETIN_BREAKER_COOLDOWN_SECS";
const ENV_QUOTE_CURRENCY: &str = "FXBULLETIN_QUOTE_CURRENCY";

/// Everything the provider needs to reach and interpret the bulletin.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub daily_rates_path: String,
    pub user_agent: String,
    /// Bound on the whole fetch, retries and backoff included.
    pub timeout: Duration,
    /// Bound on a single HTTP attempt.
    pub attempt_timeout: Duration,
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    /// Currency every bulletin rate is quoted against.
    pub quote_currency: Currency,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            daily_rates_path: String::from(DEFAULT_DAILY_RATES_PATH),
            user_agent: String::from(concat!("fxbulletin/", env!("CARGO_PKG_VERSION"))),
            timeout: Duration::from_secs(30),
            attempt_timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            quote_currency: Currency::known(DEFAULT_QUOTE_CURRENCY),
        }
    }
}

impl ProviderConfig {
    /// Defaults overridden by `FXBULLETIN_*` environment variables, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ProviderConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BASE_URL) {
            config.base_url = value;
        }
        if let Some(value) = lookup(ENV_DAILY_RATES_PATH) {
            config.daily_rates_path = value;
        }
        if let Some(value) = lookup(ENV_USER_AGENT) {
            config.user_agent = value;
        }
        if let Some(secs) = parse_env::<u64>(&lookup, ENV_TIMEOUT_SECS)? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_env::<u64>(&lookup, ENV_ATTEMPT_TIMEOUT_SECS)? {
            config.attempt_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse_env::<u32>(&lookup, ENV_RETRY_COUNT)? {
            config.retry.max_attempts = attempts;
        }
        if let Some(threshold) = parse_env::<u32>(&lookup, ENV_BREAKER_THRESHOLD)? {
            config.circuit_breaker.failure_threshold = threshold;
        }
        if let Some(secs) = parse_env::<u64>(&lookup, ENV_BREAKER_COOLDOWN_SECS)? {
            config.circuit_breaker.open_timeout = Duration::from_secs(secs);
        }
        if let Some(value) = lookup(ENV_QUOTE_CURRENCY) {
            config.quote_currency = Currency::parse(&value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Missing { field: "base_url" });
        }
        let is_http = Url::parse(&self.base_url)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
            .unwrap_or(false);
        if !is_http {
            return Err(ConfigError::InvalidUrl {
                field: "base_url",
                value: self.base_url.clone(),
            });
        }
        if HeaderValue::from_str(&self.user_agent).is_err() {
            return Err(ConfigError::InvalidUserAgent {
                value: self.user_agent.clone(),
            });
        }
        if self.daily_rates_path.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "daily_rates_path",
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::NonPositive { field: "timeout" });
        }
        if self.attempt_timeout.is_zero() {
            return Err(ConfigError::NonPositive {
                field: "attempt_timeout",
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::NonPositive {
                field: "retry.max_attempts",
            });
        }
        if self.circuit_breaker.failure_threshold == 0 {
            return Err(ConfigError::NonPositive {
                field: "circuit_breaker.failure_threshold",
            });
        }
        if self.circuit_breaker.open_timeout.is_zero() {
            return Err(ConfigError::NonPositive {
                field: "circuit_breaker.open_timeout",
            });
        }
        Ok(())
    }

    /// Absolute URL of the daily bulletin.
    pub fn daily_rates_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.daily_rates_path.trim_start_matches('/')
        )
    }
}

fn parse_env<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
{
    lookup(name)
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnv {
                name: name.to_owned(),
                value,
            })
        })
        .transpose()
}
