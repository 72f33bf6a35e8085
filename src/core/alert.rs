//! Rate alert records and the store they live in

use crate::core::currency::CurrencyCode;
use crate::core::error::RateError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// Time a recurring alert waits after firing before it re-arms.
pub const REACTIVATION_COOLDOWN_HOURS: i64 = 24;

pub fn reactivation_cooldown() -> Duration {
    Duration::hours(REACTIVATION_COOLDOWN_HOURS)
}

pub type AlertId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertCondition {
    Above,
    Below,
}

impl AlertCondition {
    /// Both directions trigger on equality.
    pub fn is_met(&self, current_rate: f64, target_rate: f64) -> bool {
        match self {
            AlertCondition::Above => current_rate >= target_rate,
            AlertCondition::Below => current_rate <= target_rate,
        }
    }
}

impl Display for AlertCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AlertCondition::Above => "ABOVE",
                AlertCondition::Below => "BELOW",
            }
        )
    }
}

impl FromStr for AlertCondition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ABOVE" => Ok(AlertCondition::Above),
            "BELOW" => Ok(AlertCondition::Below),
            _ => Err(anyhow::anyhow!("Invalid alert condition: {}", s)),
        }
    }
}

/// Request to create an alert, before validation.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub user_id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub target_rate: f64,
    pub condition: AlertCondition,
    pub recurring: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateAlert {
    pub id: AlertId,
    pub user_id: String,
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub target_rate: f64,
    pub condition: AlertCondition,
    pub is_active: bool,
    pub recurring: bool,
    pub triggered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RateAlert {
    pub fn new(request: NewAlert, now: DateTime<Utc>) -> Result<Self, RateError> {
        let from_currency = CurrencyCode::parse(&request.from_currency)?;
        let to_currency = CurrencyCode::parse(&request.to_currency)?;
        if from_currency == to_currency {
            return Err(RateError::InvalidInput(format!(
                "Alert currencies must differ, got {from_currency} twice"
            )));
        }
        if !request.target_rate.is_finite() || request.target_rate <= 0.0 {
            return Err(RateError::InvalidInput(format!(
                "Target rate must be positive, got {}",
                request.target_rate
            )));
        }
        if request.user_id.trim().is_empty() {
            return Err(RateError::InvalidInput("User id must not be empty".into()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            from_currency,
            to_currency,
            target_rate: request.target_rate,
            condition: request.condition,
            is_active: true,
            recurring: request.recurring,
            triggered_at: None,
            created_at: now,
        })
    }

    pub fn pair(&self) -> (CurrencyCode, CurrencyCode) {
        (self.from_currency.clone(), self.to_currency.clone())
    }

    pub fn should_trigger(&self, current_rate: f64) -> bool {
        self.condition.is_met(current_rate, self.target_rate)
    }

    /// Marks the alert as fired at `now`, regardless of `recurring`.
    pub fn mark_triggered(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.triggered_at = Some(now);
    }

    /// Recurring, inactive and fired at or before `cutoff`.
    pub fn is_reactivatable(&self, cutoff: DateTime<Utc>) -> bool {
        self.recurring && !self.is_active && self.triggered_at.is_some_and(|t| t <= cutoff)
    }
}

/// Persistence for alert records.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn insert(&self, alert: &RateAlert) -> Result<()>;

    /// Returns whether an alert was removed.
    async fn delete(&self, id: AlertId) -> Result<bool>;

    async fn get(&self, id: AlertId) -> Result<Option<RateAlert>>;

    /// All alerts, optionally restricted to one user, oldest first.
    async fn list(&self, user_id: Option<&str>) -> Result<Vec<RateAlert>>;

    async fn find_active(&self) -> Result<Vec<RateAlert>>;

    async fn find_reactivatable(&self, cutoff: DateTime<Utc>) -> Result<Vec<RateAlert>>;

    /// Sets `is_active` on every listed alert, returning how many were updated.
    async fn set_active(&self, ids: &[AlertId], active: bool) -> Result<usize>;

    async fn save(&self, alert: &RateAlert) -> Result<()>;
}
