//! Error types for rate resolution and alert sweeps.

use thiserror::Error;

/// Failure reported by a rate provider adapter.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The upstream call did not complete within the configured timeout.
    #[error("Rate provider timed out")]
    Timeout,

    /// Upstream answered with a non-success HTTP status.
    #[error("Rate provider returned HTTP {0}")]
    Status(u16),

    /// Connection or request level failure.
    #[error("Rate provider request failed: {0}")]
    Transport(String),

    /// Payload could not be decoded or reported an upstream error.
    #[error("Malformed rate payload: {0}")]
    Malformed(String),

    /// Rate was non-finite or not strictly positive.
    #[error("Invalid rate received: {0}")]
    InvalidRate(f64),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// Currency rejected by a [`CurrencyValidator`](crate::core::CurrencyValidator).
#[derive(Debug, Error)]
#[error("Unsupported currency: {0}")]
pub struct UnsupportedCurrency(pub String);

/// Errors surfaced by [`RateService`](crate::core::RateService).
#[derive(Debug, Error)]
pub enum RateError {
    /// Caller supplied bad input: empty code, bad amount, unsupported currency.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upstream rate source could not produce a rate.
    #[error("Rate provider unavailable: {0}")]
    ProviderUnavailable(#[from] ProviderError),
}

impl RateError {
    /// True when the caller caused the failure (4xx rather than 5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, RateError::InvalidInput(_))
    }
}

impl From<UnsupportedCurrency> for RateError {
    fn from(err: UnsupportedCurrency) -> Self {
        RateError::InvalidInput(err.to_string())
    }
}

/// Errors that abort an alert sweep.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Alert store failure: {0}")]
    Persistence(#[source] anyhow::Error),

    #[error(transparent)]
    Rate(#[from] RateError),
}

pub type RateResult<T> = Result<T, RateError>;
