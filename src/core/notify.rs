//! Best-effort side channels for alert notifications and audit events.
//!
//! Implementations may fail; callers log the failure and carry on.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RATE_ALERT_NOTIFICATION: &str = "RATE_ALERT";
pub const RATE_ALERT_TRIGGERED_ACTION: &str = "RATE_ALERT_TRIGGERED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub related_id: String,
    pub metadata: Value,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn create(&self, notification: Notification) -> Result<()>;
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log_event(&self, action: &str, entity_id: &str, metadata: Value) -> Result<()>;
}
