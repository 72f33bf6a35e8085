//! Periodic evaluation of rate alerts.
//!
//! A sweep re-arms recurring alerts whose cooldown has elapsed, loads every
//! active alert, resolves each distinct currency pair once, and fires the
//! alerts whose condition holds. Failures are isolated per pair and per
//! alert; only alert store reads and the reactivation batch abort a sweep.
//!
//! The engine has no timer of its own. Whatever hosts it calls
//! [`AlertEngine::check_and_trigger_alerts`] on its own cadence; overlapping
//! calls are serialized.

use crate::core::alert::{AlertId, AlertStore, NewAlert, RateAlert, reactivation_cooldown};
use crate::core::clock::Clock;
use crate::core::currency::{CurrencyCode, pair_key};
use crate::core::error::EngineError;
use crate::core::notify::{
    AuditSink, Notification, NotificationSink, RATE_ALERT_NOTIFICATION,
    RATE_ALERT_TRIGGERED_ACTION,
};
use crate::core::service::RateService;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

type Pair = (CurrencyCode, CurrencyCode);

/// Counts reported by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub checked: usize,
    pub triggered: usize,
    pub reactivated: usize,
}

pub struct AlertEngine {
    store: Arc<dyn AlertStore>,
    rates: Arc<RateService>,
    notifications: Arc<dyn NotificationSink>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    sweep_lock: Mutex<()>,
}

impl AlertEngine {
    pub fn new(
        store: Arc<dyn AlertStore>,
        rates: Arc<RateService>,
        notifications: Arc<dyn NotificationSink>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            rates,
            notifications,
            audit,
            clock,
            sweep_lock: Mutex::new(()),
        }
    }

    pub fn rates(&self) -> &RateService {
        &self.rates
    }

    /// Validates and stores a new alert.
    pub async fn create_alert(&self, request: NewAlert) -> Result<RateAlert, EngineError> {
        let alert = RateAlert::new(request, self.clock.now())?;
        self.rates
            .ensure_supported(alert.from_currency.as_str())
            .await?;
        self.rates.ensure_supported(alert.to_currency.as_str()).await?;

        self.store
            .insert(&alert)
            .await
            .map_err(EngineError::Persistence)?;
        info!(alert_id = %alert.id, user_id = %alert.user_id, "Created rate alert");
        Ok(alert)
    }

    pub async fn delete_alert(&self, id: AlertId) -> Result<bool, EngineError> {
        let removed = self
            .store
            .delete(id)
            .await
            .map_err(EngineError::Persistence)?;
        debug!(alert_id = %id, removed, "Delete alert");
        Ok(removed)
    }

    pub async fn list_alerts(&self, user_id: Option<&str>) -> Result<Vec<RateAlert>, EngineError> {
        self.store
            .list(user_id)
            .await
            .map_err(EngineError::Persistence)
    }

    /// Runs one complete sweep over all alerts.
    #[instrument(name = "AlertSweep", skip(self))]
    pub async fn check_and_trigger_alerts(&self) -> Result<SweepSummary, EngineError> {
        let _guard = self.sweep_lock.lock().await;
        let now = self.clock.now();

        let reactivated = self.reactivate(now).await?;

        let active = self
            .store
            .find_active()
            .await
            .map_err(EngineError::Persistence)?;

        let pairs: BTreeSet<Pair> = active.iter().map(RateAlert::pair).collect();
        debug!(
            alerts = active.len(),
            pairs = pairs.len(),
            "Resolving rates for active alerts"
        );
        let rates = self.resolve_rates(&pairs).await;

        let mut triggered = 0;
        for alert in &active {
            let Some(&current_rate) = rates.get(&alert.pair()) else {
                continue;
            };
            if !alert.should_trigger(current_rate) {
                continue;
            }
            if self.trigger(alert.clone(), current_rate, now).await {
                triggered += 1;
            }
        }

        let summary = SweepSummary {
            checked: active.len(),
            triggered,
            reactivated,
        };
        info!(
            checked = summary.checked,
            triggered = summary.triggered,
            reactivated = summary.reactivated,
            "Alert sweep complete"
        );
        Ok(summary)
    }

    async fn reactivate(&self, now: DateTime<Utc>) -> Result<usize, EngineError> {
        let cutoff = now - reactivation_cooldown();
        let due = self
            .store
            .find_reactivatable(cutoff)
            .await
            .map_err(EngineError::Persistence)?;
        if due.is_empty() {
            return Ok(0);
        }

        let ids: Vec<AlertId> = due.iter().map(|a| a.id).collect();
        self.store
            .set_active(&ids, true)
            .await
            .map_err(EngineError::Persistence)?;
        debug!(count = ids.len(), "Reactivated recurring alerts");
        Ok(ids.len())
    }

    /// Resolves every pair concurrently; failed pairs are left out of the map.
    async fn resolve_rates(&self, pairs: &BTreeSet<Pair>) -> HashMap<Pair, f64> {
        let lookups = pairs.iter().map(|(from, to)| async move {
            let result = self.rates.get_rate(from.as_str(), to.as_str()).await;
            ((from.clone(), to.clone()), result)
        });

        let mut resolved = HashMap::with_capacity(pairs.len());
        for ((from, to), result) in join_all(lookups).await {
            match result {
                Ok(rate) => {
                    resolved.insert((from, to), rate.rate);
                }
                Err(e) => {
                    warn!(
                        pair = %pair_key(&from, &to),
                        error = %e,
                        "Skipping alerts for pair, rate unavailable"
                    );
                }
            }
        }
        resolved
    }

    /// Notifies, deactivates and audits one alert. Returns whether the new
    /// state was persisted.
    async fn trigger(&self, mut alert: RateAlert, current_rate: f64, now: DateTime<Utc>) -> bool {
        let details = json!({
            "from_currency": alert.from_currency,
            "to_currency": alert.to_currency,
            "condition": alert.condition,
            "target_rate": alert.target_rate,
            "current_rate": current_rate,
            "recurring": alert.recurring,
        });

        let notification = Notification {
            user_id: alert.user_id.clone(),
            kind: RATE_ALERT_NOTIFICATION.to_string(),
            title: format!(
                "{}/{} rate alert triggered",
                alert.from_currency, alert.to_currency
            ),
            message: format!(
                "{}/{} is now {}, {} your target of {}",
                alert.from_currency,
                alert.to_currency,
                current_rate,
                alert.condition.to_string().to_lowercase(),
                alert.target_rate
            ),
            related_id: alert.id.to_string(),
            metadata: details.clone(),
        };
        if let Err(e) = self.notifications.create(notification).await {
            warn!(alert_id = %alert.id, error = %e, "Failed to send alert notification");
        }

        alert.mark_triggered(now);
        if let Err(e) = self.store.save(&alert).await {
            error!(alert_id = %alert.id, error = %e, "Failed to persist triggered alert");
            return false;
        }

        if let Err(e) = self
            .audit
            .log_event(RATE_ALERT_TRIGGERED_ACTION, &alert.id.to_string(), details)
            .await
        {
            warn!(alert_id = %alert.id, error = %e, "Failed to write audit event");
        }

        info!(alert_id = %alert.id, current_rate, "Rate alert triggered");
        true
    }
}
