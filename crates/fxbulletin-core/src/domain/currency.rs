use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const CODE_LEN: usize = 3;

/// ISO-style currency code, always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Parse and normalize a currency code to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let is_valid = normalized.len() == CODE_LEN
            && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

        if !is_valid {
            return Err(ValidationError::InvalidCurrency {
                value: input.to_owned(),
            });
        }

        Ok(Self(normalized))
    }

    /// Built-in code that is valid by construction.
    pub(crate) fn known(code: &'static str) -> Self {
        debug_assert!(Self::parse(code).is_ok(), "invalid built-in code {code}");
        Self(code.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw code.
    pub fn matches(&self, code: &str) -> bool {
        self.0.eq_ignore_ascii_case(code.trim())
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Currency {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for Currency {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Currency {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_code() {
        let parsed = Currency::parse(" aud ").expect("code should parse");
        assert_eq!(parsed.as_str(), "AUD");
    }

    #[test]
    fn equality_is_by_normalized_code() {
        let lower = Currency::parse("eur").expect("valid");
        let upper = Currency::parse("EUR").expect("valid");
        assert_eq!(lower, upper);
    }

    #[test]
    fn rejects_wrong_length() {
        for input in ["", "US", "USDX", "   "] {
            let err = Currency::parse(input).expect_err("must fail");
            assert!(matches!(err, ValidationError::InvalidCurrency { .. }));
        }
    }

    #[test]
    fn rejects_non_letters() {
        let err = Currency::parse("U5D").expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::InvalidCurrency {
                value: String::from("U5D")
            }
        );
    }

    #[test]
    fn matches_ignores_case() {
        let currency = Currency::parse("JPY").expect("valid");
        assert!(currency.matches("jpy"));
        assert!(!currency.matches("JPN"));
    }

    #[test]
    fn deserializes_through_validation() {
        let parsed: Currency = serde_json::from_str("\"thb\"").expect("valid json code");
        assert_eq!(parsed.as_str(), "THB");

        let invalid = serde_json::from_str::<Currency>("\"baht\"");
        assert!(invalid.is_err());
    }
}
