//! Rate provider abstraction and core rate types

use crate::core::currency::CurrencyCode;
use crate::core::error::ProviderError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fresh rate as reported by an upstream provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRate {
    pub rate: f64,
    /// RFC 3339 timestamp of when the quote was fetched.
    pub fetched_at: String,
    pub source: String,
}

impl ProviderRate {
    /// Rejects rates that are non-finite or not strictly positive.
    pub fn checked(rate: f64, fetched_at: String, source: &str) -> Result<Self, ProviderError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ProviderError::InvalidRate(rate));
        }
        Ok(Self {
            rate,
            fetched_at,
            source: source.to_string(),
        })
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<ProviderRate, ProviderError>;
}

/// A resolved rate for a currency pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRate {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Result of converting an amount between two currencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub amount: f64,
    pub rate: f64,
    pub converted_amount: f64,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_rejects_bad_rates() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = ProviderRate::checked(bad, String::new(), "test").unwrap_err();
            assert!(matches!(err, ProviderError::InvalidRate(_)));
        }
        let ok = ProviderRate::checked(1.25, "2024-01-01T00:00:00Z".into(), "test").unwrap();
        assert_eq!(ok.rate, 1.25);
        assert_eq!(ok.source, "test");
    }
}
