use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Currency, ValidationError};

/// Value of one unit of `source` expressed in `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawExchangeRate")]
pub struct ExchangeRate {
    source: Currency,
    target: Currency,
    value: Decimal,
}

impl ExchangeRate {
    pub fn new(source: Currency, target: Currency, value: Decimal) -> Result<Self, ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveRate { value });
        }

        Ok(Self {
            source,
            target,
            value,
        })
    }

    pub fn source(&self) -> &Currency {
        &self.source
    }

    pub fn target(&self) -> &Currency {
        &self.target
    }

    pub const fn value(&self) -> Decimal {
        self.value
    }
}

/// Unvalidated wire form; deserialization goes through [`ExchangeRate::new`].
#[derive(Deserialize)]
struct RawExchangeRate {
    source: Currency,
    target: Currency,
    value: Decimal,
}

impl TryFrom<RawExchangeRate> for ExchangeRate {
    type Error = ValidationError;

    fn try_from(raw: RawExchangeRate) -> Result<Self, Self::Error> {
        Self::new(raw.source, raw.target, raw.value)
    }
}

impl Display for ExchangeRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} = {}", self.source, self.target, self.value)
    }
}
