//! Rate resolution and precise conversion over the shared rate cache.

use crate::core::cache::{RateCache, RateCacheEntry};
use crate::core::clock::Clock;
use crate::core::currency::{CurrencyCode, CurrencyValidator, pair_key};
use crate::core::decimal;
use crate::core::error::{RateError, RateResult};
use crate::core::rate::{Conversion, PairRate, RateProvider};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub struct RateService {
    cache: RateCache,
    provider: Arc<dyn RateProvider>,
    validator: Arc<dyn CurrencyValidator>,
    clock: Arc<dyn Clock>,
}

impl RateService {
    pub fn new(
        cache: RateCache,
        provider: Arc<dyn RateProvider>,
        validator: Arc<dyn CurrencyValidator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache,
            provider,
            validator,
            clock,
        }
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    pub fn normalize(code: &str) -> RateResult<CurrencyCode> {
        CurrencyCode::parse(code)
    }

    /// Normalizes a code and checks it against the validator.
    pub async fn ensure_supported(&self, code: &str) -> RateResult<CurrencyCode> {
        let code = Self::normalize(code)?;
        self.validator.validate_currency(&code).await?;
        Ok(code)
    }

    #[instrument(name = "GetRate", skip(self))]
    pub async fn get_rate(&self, from: &str, to: &str) -> RateResult<PairRate> {
        let from = Self::normalize(from)?;
        let to = Self::normalize(to)?;
        self.validator.validate_currency(&from).await?;
        self.validator.validate_currency(&to).await?;

        let key = pair_key(&from, &to);
        if let Some(entry) = self.cache.get(&key).await {
            return Ok(to_pair_rate(from, to, entry));
        }

        if from == to {
            debug!(pair = %key, "Identity pair, synthesizing rate");
            let now = self.clock.now().to_rfc3339();
            let entry = self.cache.set(&key, 1.0, &now).await;
            return Ok(to_pair_rate(from, to, entry));
        }

        let fetched = self.provider.fetch_rate(&from, &to).await.map_err(|e| {
            warn!(pair = %key, error = %e, "Rate provider failed");
            RateError::ProviderUnavailable(e)
        })?;
        debug!(pair = %key, rate = fetched.rate, source = %fetched.source, "Fetched rate");

        let entry = self
            .cache
            .set(&key, fetched.rate, &fetched.fetched_at)
            .await;
        Ok(to_pair_rate(from, to, entry))
    }

    pub async fn convert(&self, from: &str, to: &str, amount: f64) -> RateResult<Conversion> {
        let from = Self::normalize(from)?;
        let to = Self::normalize(to)?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(RateError::InvalidInput(format!(
                "Amount must be a finite, non-negative number, got {amount}"
            )));
        }

        let resolved = self.get_rate(from.as_str(), to.as_str()).await?;
        let converted_amount = decimal::multiply(amount, resolved.rate);

        Ok(Conversion {
            from,
            to,
            amount,
            rate: resolved.rate,
            converted_amount,
            fetched_at: resolved.fetched_at,
            expires_at: resolved.expires_at,
        })
    }
}

fn to_pair_rate(from: CurrencyCode, to: CurrencyCode, entry: RateCacheEntry) -> PairRate {
    PairRate {
        from,
        to,
        rate: entry.rate,
        fetched_at: entry.fetched_at,
        expires_at: entry.expires_at,
    }
}
