use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::CurrencyCode;
use crate::core::error::ProviderError;
use crate::core::rate::{ProviderRate, RateProvider};

const SOURCE: &str = "exchangerate-api";

/// Pair-conversion client for exchangerate-api style endpoints:
/// `GET {base_url}/pair/{FROM}/{TO}`.
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxalert/0.1")
            .timeout(timeout)
            .build()?;
        Ok(ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PairResponse {
    result: String,
    conversion_rate: Option<f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self), fields(from = %from, to = %to))]
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<ProviderRate, ProviderError> {
        let url = format!("{}/pair/{}/{}", self.base_url, from, to);
        debug!("Requesting currency rate from {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let text = response.text().await?;
        let data: PairResponse = serde_json::from_str(&text).map_err(|e| {
            ProviderError::Malformed(format!("Failed to parse JSON response for {from}/{to}: {e}"))
        })?;

        if data.result != "success" {
            return Err(ProviderError::Malformed(format!(
                "Upstream reported {} for {from}/{to}",
                data.error_type.as_deref().unwrap_or("an error")
            )));
        }
        let rate = data.conversion_rate.ok_or_else(|| {
            ProviderError::Malformed(format!("No conversion rate for {from}/{to}"))
        })?;

        ProviderRate::checked(rate, Utc::now().to_rfc3339(), SOURCE)
    }
}
