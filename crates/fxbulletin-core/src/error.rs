use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

/// Validation errors raised when constructing domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("currency must be a 3-letter ISO code: '{value}'")]
    InvalidCurrency { value: String },

    #[error("exchange rate value must be positive, got {value}")]
    NonPositiveRate { value: Decimal },
}

/// Classified failure of a bulletin parse.
///
/// Record-level variants carry the 1-based position of the offending line
/// among the non-empty lines of the bulletin.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("bulletin is empty or whitespace only")]
    EmptyInput,

    #[error("bulletin has {line_count} non-empty lines, expected at least 3")]
    InsufficientLines { line_count: usize },

    #[error("header is not in '<date> #<sequence>' format: '{header}'")]
    MalformedHeader { header: String },

    #[error("header date is not in '<day> <Mon> <year>' format: '{value}'")]
    InvalidDate { value: String },

    #[error("header sequence is not a non-negative integer: '{value}'")]
    InvalidSequence { value: String },

    #[error("column names are not 'Country|Currency|Amount|Code|Rate': '{value}'")]
    UnexpectedColumns { value: String },

    #[error("line {line}: expected 5 pipe-separated fields, found {fields}: '{value}'")]
    MalformedRecord {
        line: usize,
        fields: usize,
        value: String,
    },

    #[error("line {line}: amount must be a positive integer: '{value}'")]
    InvalidAmount { line: usize, value: String },

    #[error("line {line}: rate must be a positive decimal: '{value}'")]
    InvalidRate { line: usize, value: String },
}

/// Classified failure of a bulletin fetch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("bulletin fetch did not complete within {}ms", .after.as_millis())]
    Timeout { after: Duration },

    #[error("non-transient fetch failure: {cause}")]
    NonTransient { status: Option<u16>, cause: String },

    #[error("circuit breaker is open; upstream call skipped")]
    CircuitOpen,

    #[error("bulletin fetch was cancelled")]
    Cancelled,

    /// Single-attempt transient failure. The retry layer never lets this
    /// escape; it becomes [`FetchError::TransientExhausted`] instead.
    #[error("transient fetch failure: {cause}")]
    Transient { status: Option<u16>, cause: String },

    #[error("giving up after {attempts} attempts: {last}")]
    TransientExhausted { attempts: u32, last: String },
}

impl FetchError {
    pub fn transient(status: Option<u16>, cause: impl Into<String>) -> Self {
        Self::Transient {
            status,
            cause: cause.into(),
        }
    }

    pub fn non_transient(status: Option<u16>, cause: impl Into<String>) -> Self {
        Self::NonTransient {
            status,
            cause: cause.into(),
        }
    }

    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NonTransient { status, .. } | Self::Transient { status, .. } => *status,
            _ => None,
        }
    }
}

/// Error returned by [`crate::RateProvider`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("failed to fetch bulletin: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("failed to parse bulletin: {0}")]
    ParseFailed(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Invalid provider configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be an absolute http(s) URL: '{value}'")]
    InvalidUrl { field: &'static str, value: String },

    #[error("user agent is not a valid header value: {value:?}")]
    InvalidUserAgent { value: String },

    #[error("{field} must be positive")]
    NonPositive { field: &'static str },

    #[error("environment variable {name} has an invalid value: '{value}'")]
    InvalidEnv { name: String, value: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
