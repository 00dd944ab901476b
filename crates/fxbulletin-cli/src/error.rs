use fxbulletin_core::{ConfigError, FetchError, ParseError, ProviderError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("failed to parse bulletin: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Config(_) => 2,
            Self::Provider(ProviderError::Validation(_)) => 2,
            Self::Provider(ProviderError::FetchFailed(FetchError::Cancelled)) => 130,
            Self::Provider(ProviderError::FetchFailed(_)) => 3,
            Self::Provider(ProviderError::ParseFailed(_)) => 4,
            Self::Parse(_) => 4,
            Self::Serialization(_) => 5,
            Self::Io(_) => 10,
        }
    }
}
