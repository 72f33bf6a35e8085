use crate::core::alert::{AlertId, AlertStore, RateAlert};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory alert store using a HashMap behind an async mutex
#[derive(Default)]
pub struct MemoryAlertStore {
    alerts: Mutex<HashMap<AlertId, RateAlert>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select(&self, keep: impl Fn(&RateAlert) -> bool) -> Vec<RateAlert> {
        let alerts = self.alerts.lock().await;
        let mut selected: Vec<RateAlert> = alerts.values().filter(|a| keep(*a)).cloned().collect();
        selected.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        selected
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn insert(&self, alert: &RateAlert) -> Result<()> {
        let mut alerts = self.alerts.lock().await;
        if alerts.contains_key(&alert.id) {
            anyhow::bail!("Alert {} already exists", alert.id);
        }
        alerts.insert(alert.id, alert.clone());
        debug!(alert_id = %alert.id, "Store INSERT");
        Ok(())
    }

    async fn delete(&self, id: AlertId) -> Result<bool> {
        let removed = self.alerts.lock().await.remove(&id).is_some();
        debug!(alert_id = %id, removed, "Store DELETE");
        Ok(removed)
    }

    async fn get(&self, id: AlertId) -> Result<Option<RateAlert>> {
        Ok(self.alerts.lock().await.get(&id).cloned())
    }

    async fn list(&self, user_id: Option<&str>) -> Result<Vec<RateAlert>> {
        Ok(self
            .select(|a| user_id.is_none_or(|u| a.user_id == u))
            .await)
    }

    async fn find_active(&self) -> Result<Vec<RateAlert>> {
        Ok(self.select(|a| a.is_active).await)
    }

    async fn find_reactivatable(&self, cutoff: DateTime<Utc>) -> Result<Vec<RateAlert>> {
        Ok(self.select(|a| a.is_reactivatable(cutoff)).await)
    }

    async fn set_active(&self, ids: &[AlertId], active: bool) -> Result<usize> {
        let mut alerts = self.alerts.lock().await;
        let mut updated = 0;
        for id in ids {
            if let Some(alert) = alerts.get_mut(id) {
                alert.is_active = active;
                updated += 1;
            }
        }
        debug!(updated, active, "Store SET_ACTIVE");
        Ok(updated)
    }

    async fn save(&self, alert: &RateAlert) -> Result<()> {
        self.alerts.lock().await.insert(alert.id, alert.clone());
        debug!(alert_id = %alert.id, "Store SAVE");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alert::{AlertCondition, NewAlert};
    use chrono::{Duration, TimeZone};

    fn alert(user: &str, minutes: i64) -> RateAlert {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes);
        RateAlert::new(
            NewAlert {
                user_id: user.to_string(),
                from_currency: "USD".to_string(),
                to_currency: "EUR".to_string(),
                target_rate: 0.9,
                condition: AlertCondition::Below,
                recurring: true,
            },
            created,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_delete() {
        let store = MemoryAlertStore::new();
        let a = alert("u1", 0);

        store.insert(&a).await.unwrap();
        assert!(store.insert(&a).await.is_err());
        assert_eq!(store.get(a.id).await.unwrap(), Some(a.clone()));

        assert!(store.delete(a.id).await.unwrap());
        assert!(store.get(a.id).await.unwrap().is_none());
        assert!(!store.delete(a.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_orders_by_creation() {
        let store = MemoryAlertStore::new();
        let late = alert("u1", 10);
        let early = alert("u2", 0);
        store.insert(&late).await.unwrap();
        store.insert(&early).await.unwrap();

        let all = store.list(None).await.unwrap();
        assert_eq!(all, vec![early.clone(), late.clone()]);
        assert_eq!(store.list(Some("u1")).await.unwrap(), vec![late]);
    }

    #[tokio::test]
    async fn test_active_and_reactivation_queries() {
        let store = MemoryAlertStore::new();
        let active = alert("u1", 0);
        let mut fired = alert("u1", 1);
        let fired_at = fired.created_at + Duration::hours(1);
        fired.mark_triggered(fired_at);
        store.insert(&active).await.unwrap();
        store.insert(&fired).await.unwrap();

        assert_eq!(store.find_active().await.unwrap(), vec![active.clone()]);
        assert!(store
            .find_reactivatable(fired_at - Duration::seconds(1))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            store.find_reactivatable(fired_at).await.unwrap(),
            vec![fired.clone()]
        );

        let updated = store.set_active(&[fired.id], true).await.unwrap();
        assert_eq!(updated, 1);
        let reloaded = store.get(fired.id).await.unwrap().unwrap();
        assert!(reloaded.is_active);
        assert_eq!(reloaded.triggered_at, Some(fired_at));
        assert_eq!(store.find_active().await.unwrap().len(), 2);
    }
}
