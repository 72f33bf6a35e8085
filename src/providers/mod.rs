pub mod exchangerate;
pub mod yahoo_finance;

use crate::core::config::{ProviderConfig, ProviderKind};
use crate::core::rate::RateProvider;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

/// Builds the rate provider selected in configuration.
pub fn from_config(config: &ProviderConfig) -> Result<Arc<dyn RateProvider>> {
    let timeout = Duration::from_millis(config.timeout_ms);
    let provider: Arc<dyn RateProvider> = match config.kind {
        ProviderKind::ExchangeRate => Arc::new(exchangerate::ExchangeRateApiProvider::new(
            config.base_url(),
            config.api_key.clone(),
            timeout,
        )?),
        ProviderKind::Yahoo => Arc::new(yahoo_finance::YahooRateProvider::new(
            config.base_url(),
            timeout,
        )?),
    };
    Ok(provider)
}
