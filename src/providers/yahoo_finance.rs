use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::CurrencyCode;
use crate::core::error::ProviderError;
use crate::core::rate::{ProviderRate, RateProvider};

const SOURCE: &str = "yahoo";

// YahooRateProvider reads FX quotes from the chart endpoint, e.g. USDNGN=X
pub struct YahooRateProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooRateProvider {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxalert/0.1")
            .timeout(timeout)
            .build()?;
        Ok(YahooRateProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct YahooCurrencyResponse {
    chart: CurrencyChartResult,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartResult {
    result: Vec<CurrencyChartItem>,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartItem {
    meta: CurrencyChartMeta,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
}

#[async_trait]
impl RateProvider for YahooRateProvider {
    #[instrument(name = "YahooRateFetch", skip(self), fields(from = %from, to = %to))]
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<ProviderRate, ProviderError> {
        let symbol = format!("{from}{to}=X");
        let url = format!("{}/v8/finance/chart/{symbol}", self.base_url);
        debug!("Requesting currency rate from {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let text = response.text().await?;

        let data: YahooCurrencyResponse = serde_json::from_str(&text).map_err(|e| {
            ProviderError::Malformed(format!("Failed to parse JSON response for {symbol}: {e}"))
        })?;

        let item = data.chart.result.into_iter().next().ok_or_else(|| {
            ProviderError::Malformed(format!("No rate data found for currency pair: {symbol}"))
        })?;

        ProviderRate::checked(
            item.meta.regular_market_price,
            Utc::now().to_rfc3339(),
            SOURCE,
        )
    }
}
