use crate::core::alert::{AlertId, AlertStore, RateAlert};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const ALERTS_PARTITION: &str = "alerts";

fn key(id: &AlertId) -> &[u8] {
    id.as_bytes()
}

/// Alert store persisting JSON-encoded alerts in a fjall partition keyed by id.
pub struct DiskAlertStore {
    keyspace: Keyspace,
    alerts: PartitionHandle,
}

impl DiskAlertStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        let keyspace = Config::new(path.join("alerts_db"))
            .open()
            .with_context(|| format!("Failed to open alert store at {}", path.display()))?;
        let alerts = keyspace.open_partition(ALERTS_PARTITION, PartitionCreateOptions::default())?;
        debug!(path = %path.display(), "Opened alert store");
        Ok(Self { keyspace, alerts })
    }

    fn read(&self, id: AlertId) -> Result<Option<RateAlert>> {
        match self.alerts.get(key(&id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, alert: &RateAlert) -> Result<()> {
        self.alerts
            .insert(key(&alert.id), serde_json::to_vec(alert)?)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    fn select(&self, keep: impl Fn(&RateAlert) -> bool) -> Result<Vec<RateAlert>> {
        let mut selected = Vec::new();
        for item in self.alerts.iter() {
            let (_, bytes) = item?;
            let alert: RateAlert = serde_json::from_slice(&bytes)
                .context("Failed to decode stored alert")?;
            if keep(&alert) {
                selected.push(alert);
            }
        }
        selected.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(selected)
    }
}

#[async_trait]
impl AlertStore for DiskAlertStore {
    async fn insert(&self, alert: &RateAlert) -> Result<()> {
        if self.alerts.contains_key(key(&alert.id))? {
            anyhow::bail!("Alert {} already exists", alert.id);
        }
        self.write(alert)?;
        self.flush()?;
        debug!(alert_id = %alert.id, "Store INSERT");
        Ok(())
    }

    async fn delete(&self, id: AlertId) -> Result<bool> {
        if !self.alerts.contains_key(key(&id))? {
            return Ok(false);
        }
        self.alerts.remove(key(&id))?;
        self.flush()?;
        debug!(alert_id = %id, "Store DELETE");
        Ok(true)
    }

    async fn get(&self, id: AlertId) -> Result<Option<RateAlert>> {
        self.read(id)
    }

    async fn list(&self, user_id: Option<&str>) -> Result<Vec<RateAlert>> {
        self.select(|a| user_id.is_none_or(|u| a.user_id == u))
    }

    async fn find_active(&self) -> Result<Vec<RateAlert>> {
        self.select(|a| a.is_active)
    }

    async fn find_reactivatable(&self, cutoff: DateTime<Utc>) -> Result<Vec<RateAlert>> {
        self.select(|a| a.is_reactivatable(cutoff))
    }

    async fn set_active(&self, ids: &[AlertId], active: bool) -> Result<usize> {
        let mut updated = 0;
        for id in ids {
            if let Some(mut alert) = self.read(*id)? {
                alert.is_active = active;
                self.write(&alert)?;
                updated += 1;
            }
        }
        self.flush()?;
        debug!(updated, active, "Store SET_ACTIVE");
        Ok(updated)
    }

    async fn save(&self, alert: &RateAlert) -> Result<()> {
        self.write(alert)?;
        self.flush()?;
        debug!(alert_id = %alert.id, "Store SAVE");
        Ok(())
    }
}
