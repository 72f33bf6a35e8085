use super::ui;
use crate::core::engine::{AlertEngine, SweepSummary};
use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

pub fn render_summary(summary: &SweepSummary) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Checked"),
        ui::header_cell("Triggered"),
        ui::header_cell("Reactivated"),
    ]);
    table.add_row(vec![
        ui::number_cell(summary.checked.to_string()),
        ui::number_cell(summary.triggered.to_string()),
        ui::number_cell(summary.reactivated.to_string()),
    ]);
    table.to_string()
}

pub async fn run_once(engine: &AlertEngine) -> Result<()> {
    let summary = engine.check_and_trigger_alerts().await?;
    println!("{}", render_summary(&summary));
    Ok(())
}

/// Sweeps on a fixed interval until `shutdown` resolves. Returns the number of
/// sweeps that completed successfully.
pub async fn watch_until<F>(engine: &AlertEngine, every: Duration, shutdown: F) -> usize
where
    F: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut completed = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!(completed, "Stopping alert watcher");
                return completed;
            }
            _ = interval.tick() => {
                match engine.check_and_trigger_alerts().await {
                    Ok(summary) => {
                        completed += 1;
                        info!(
                            checked = summary.checked,
                            triggered = summary.triggered,
                            reactivated = summary.reactivated,
                            "Scheduled sweep finished"
                        );
                    }
                    Err(e) => error!(error = %e, "Scheduled sweep failed"),
                }
            }
        }
    }
}

/// Runs the scheduler until Ctrl-C.
pub async fn watch(engine: &AlertEngine, every: Duration) -> Result<()> {
    info!(interval_secs = every.as_secs(), "Watching rate alerts");
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    };
    watch_until(engine, every, shutdown).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alert::{AlertCondition, NewAlert};
    use crate::core::clock::ManualClock;
    use crate::core::notify::{AuditSink, Notification, NotificationSink};
    use crate::core::service::tests::{MockRateProvider, service_with, start};
    use crate::store::memory::MemoryAlertStore;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    struct Quiet;

    #[async_trait]
    impl NotificationSink for Quiet {
        async fn create(&self, _notification: Notification) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl AuditSink for Quiet {
        async fn log_event(&self, _action: &str, _entity_id: &str, _metadata: Value) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_render_summary() {
        let output = render_summary(&SweepSummary {
            checked: 4,
            triggered: 2,
            reactivated: 1,
        });
        assert!(output.contains("Checked"));
        assert!(output.contains("Reactivated"));
        assert!(output.contains('4'));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_sweeps_until_shutdown() {
        let clock = Arc::new(ManualClock::new(start()));
        let provider = Arc::new(MockRateProvider::new(clock.clone()));
        provider.set_rate("USD", "NGN", 1650.0);
        let engine = AlertEngine::new(
            Arc::new(MemoryAlertStore::new()),
            Arc::new(service_with(clock.clone(), provider.clone())),
            Arc::new(Quiet),
            Arc::new(Quiet),
            clock,
        );
        let mut request = NewAlert {
            user_id: "u1".into(),
            from_currency: "USD".into(),
            to_currency: "NGN".into(),
            target_rate: 1600.0,
            condition: AlertCondition::Above,
            recurring: false,
        };
        engine.create_alert(request.clone()).await.unwrap();
        request.target_rate = 1700.0;
        engine.create_alert(request).await.unwrap();

        let completed = watch_until(
            &engine,
            Duration::from_millis(100),
            tokio::time::sleep(Duration::from_millis(250)),
        )
        .await;

        assert_eq!(completed, 3);
        // the second alert stays armed, so every sweep needs its pair;
        // the cached rate serves all but the first
        assert_eq!(provider.calls_for("USD", "NGN"), 1);
    }
}
