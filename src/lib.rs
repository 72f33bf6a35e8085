pub mod cli;
pub mod core;
pub mod providers;
pub mod sinks;
pub mod store;

use crate::core::alert::{AlertId, NewAlert};
use crate::core::cache::RateCache;
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::AppConfig;
use crate::core::currency::StaticCurrencyValidator;
use crate::core::engine::AlertEngine;
use crate::core::service::RateService;
use crate::sinks::{JsonlAuditSink, LogNotificationSink};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum AppCommand {
    Rate {
        from: String,
        to: String,
    },
    Convert {
        from: String,
        to: String,
        amount: f64,
    },
    AddAlert(NewAlert),
    ListAlerts {
        user_id: Option<String>,
    },
    RemoveAlert {
        id: AlertId,
    },
    Sweep,
    Watch {
        interval_seconds: Option<u64>,
    },
}

/// Builds the rate service: one cache, one provider, one validator.
pub fn build_rate_service(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Arc<RateService>> {
    let cache = RateCache::new(&config.cache, clock.clone());
    let provider = providers::from_config(&config.provider)?;
    let validator = Arc::new(StaticCurrencyValidator::new(&config.currencies));
    Ok(Arc::new(RateService::new(cache, provider, validator, clock)))
}

/// Builds the alert engine on top of the persistent store and default sinks.
pub fn build_engine(
    config: &AppConfig,
    rates: Arc<RateService>,
    clock: Arc<dyn Clock>,
) -> Result<AlertEngine> {
    let store = store::open_alert_store(config)?;
    let audit = Arc::new(JsonlAuditSink::new(
        config.data_dir()?.join("audit.jsonl"),
        clock.clone(),
    ));
    Ok(AlertEngine::new(
        store,
        rates,
        Arc::new(LogNotificationSink),
        audit,
        clock,
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rates = build_rate_service(&config, clock.clone())?;

    match command {
        AppCommand::Rate { from, to } => cli::rates::show_rate(&rates, &from, &to).await,
        AppCommand::Convert { from, to, amount } => {
            cli::rates::show_conversion(&rates, &from, &to, amount).await
        }
        AppCommand::AddAlert(request) => {
            let engine = build_engine(&config, rates, clock)?;
            cli::alerts::add_alert(&engine, request).await
        }
        AppCommand::ListAlerts { user_id } => {
            let engine = build_engine(&config, rates, clock)?;
            cli::alerts::list_alerts(&engine, user_id.as_deref()).await
        }
        AppCommand::RemoveAlert { id } => {
            let engine = build_engine(&config, rates, clock)?;
            cli::alerts::remove_alert(&engine, id).await
        }
        AppCommand::Sweep => {
            let engine = build_engine(&config, rates, clock)?;
            cli::sweep::run_once(&engine).await
        }
        AppCommand::Watch { interval_seconds } => {
            let engine = build_engine(&config, rates, clock)?;
            let seconds = interval_seconds
                .unwrap_or(config.schedule.interval_seconds)
                .max(1);
            cli::sweep::watch(&engine, Duration::from_secs(seconds)).await
        }
    }
}
