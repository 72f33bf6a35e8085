//! Notification and audit adapters used by the command line front end.

use crate::core::clock::Clock;
use crate::core::notify::{AuditSink, Notification, NotificationSink};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Emits notifications as tracing events.
#[derive(Debug, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn create(&self, notification: Notification) -> Result<()> {
        info!(
            user_id = %notification.user_id,
            kind = %notification.kind,
            related_id = %notification.related_id,
            metadata = %notification.metadata,
            "{}: {}",
            notification.title,
            notification.message
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub at: chrono::DateTime<Utc>,
    pub action: String,
    pub entity_id: String,
    pub metadata: Value,
}

/// Appends audit events to a JSON lines file, stamped by the shared clock.
pub struct JsonlAuditSink {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn log_event(&self, action: &str, entity_id: &str, metadata: Value) -> Result<()> {
        let record = AuditRecord {
            at: self.clock.now(),
            action: action.to_string(),
            entity_id: entity_id.to_string(),
            metadata,
        };
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open audit log: {}", self.path.display()))?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_jsonl_audit_appends_records() -> Result<()> {
        let dir = TempDir::new()?;
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let sink = JsonlAuditSink::new(dir.path().join("logs").join("audit.jsonl"), clock.clone());

        sink.log_event("RATE_ALERT_TRIGGERED", "a-1", json!({"current_rate": 1650.0}))
            .await?;
        clock.advance(Duration::minutes(5));
        sink.log_event("RATE_ALERT_TRIGGERED", "a-2", json!({})).await?;

        let content = std::fs::read_to_string(sink.path())?;
        let records: Vec<AuditRecord> = content
            .lines()
            .map(serde_json::from_str)
            .collect::<Result<_, _>>()?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entity_id, "a-1");
        assert_eq!(records[0].metadata["current_rate"], 1650.0);
        assert_eq!(records[1].action, "RATE_ALERT_TRIGGERED");
        assert_eq!(records[0].at, start);
        assert_eq!(records[1].at, start + Duration::minutes(5));
        Ok(())
    }

    #[tokio::test]
    async fn test_log_notification_never_fails() {
        let sink = LogNotificationSink;
        let result = sink
            .create(Notification {
                user_id: "u1".into(),
                kind: "RATE_ALERT".into(),
                title: "t".into(),
                message: "m".into(),
                related_id: "a-1".into(),
                metadata: json!({}),
            })
            .await;
        assert!(result.is_ok());
    }
}
