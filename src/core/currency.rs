//! Currency codes and currency validation

use crate::core::error::{RateError, UnsupportedCurrency};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;

/// A trimmed, upper-cased currency code such as `USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn parse(code: &str) -> Result<Self, RateError> {
        let normalized = code.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(RateError::InvalidInput(
                "Currency code must not be empty".to_string(),
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = RateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Builds the cache key for a currency pair, e.g. `USD_NGN`.
pub fn pair_key(from: &CurrencyCode, to: &CurrencyCode) -> String {
    format!("{from}_{to}")
}

#[async_trait]
pub trait CurrencyValidator: Send + Sync {
    async fn validate_currency(&self, code: &CurrencyCode) -> Result<(), UnsupportedCurrency>;
}

/// Validator backed by a fixed set of supported codes.
pub struct StaticCurrencyValidator {
    supported: HashSet<CurrencyCode>,
}

impl StaticCurrencyValidator {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let supported = codes
            .into_iter()
            .filter_map(|c| CurrencyCode::parse(c.as_ref()).ok())
            .collect();
        Self { supported }
    }
}

#[async_trait]
impl CurrencyValidator for StaticCurrencyValidator {
    async fn validate_currency(&self, code: &CurrencyCode) -> Result<(), UnsupportedCurrency> {
        if self.supported.contains(code) {
            Ok(())
        } else {
            Err(UnsupportedCurrency(code.to_string()))
        }
    }
}
