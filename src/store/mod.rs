pub mod disk;
pub mod memory;

use crate::core::alert::AlertStore;
use crate::core::config::AppConfig;
use anyhow::Result;
use disk::DiskAlertStore;
use std::sync::Arc;

/// Opens the persistent alert store under the configured data path.
pub fn open_alert_store(config: &AppConfig) -> Result<Arc<dyn AlertStore>> {
    let path = config.data_dir()?;
    Ok(Arc::new(DiskAlertStore::open(&path)?))
}
