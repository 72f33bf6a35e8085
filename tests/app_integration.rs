use fxalert::core::alert::{AlertCondition, NewAlert};
use fxalert::core::clock::{Clock, SystemClock};
use fxalert::core::config::AppConfig;
use fxalert::sinks::AuditRecord;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_pair_server(from: &str, to: &str, rate: f64) -> MockServer {
        let mock_server = MockServer::start().await;
        let body = format!(
            r#"{{"result": "success", "base_code": "{from}", "target_code": "{to}", "conversion_rate": {rate}}}"#
        );

        Mock::given(method("GET"))
            .and(path(format!("/pair/{from}/{to}")))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn config_yaml(base_url: &str, data_path: &std::path::Path) -> String {
        format!(
            r#"
        cache:
          ttl_seconds: 600
          max_size: 100
        provider:
          kind: exchangerate
          base_url: {}
          api_key: test-key
          timeout_ms: 2000
        currencies: ["USD", "NGN", "EUR"]
        data_path: {}
    "#,
            base_url,
            data_path.display()
        )
    }
}

fn write_config(dir: &Path, base_url: &str) -> std::path::PathBuf {
    let data_path = dir.join("data");
    let config_path = dir.join("config.yaml");
    fs::write(&config_path, test_utils::config_yaml(base_url, &data_path))
        .expect("Failed to write config file");
    config_path
}

#[test_log::test(tokio::test)]
async fn test_rate_and_convert_commands_with_mock() {
    let mock_server = test_utils::create_pair_server("NGN", "USD", 0.00062).await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &mock_server.uri());
    let config_path = config_path.to_str().unwrap();

    let result = fxalert::run_command(
        fxalert::AppCommand::Rate {
            from: "ngn".into(),
            to: "usd".into(),
        },
        Some(config_path),
    )
    .await;
    assert!(result.is_ok(), "Rate command failed with: {:?}", result.err());

    let result = fxalert::run_command(
        fxalert::AppCommand::Convert {
            from: "NGN".into(),
            to: "USD".into(),
            amount: 25000.0,
        },
        Some(config_path),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_rate_command_rejects_unsupported_currency() {
    let mock_server = test_utils::create_pair_server("USD", "NGN", 1650.0).await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), &mock_server.uri());

    let result = fxalert::run_command(
        fxalert::AppCommand::Rate {
            from: "USD".into(),
            to: "XYZ".into(),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("unsupported currency should fail");
    assert!(err.to_string().contains("XYZ"), "unexpected error: {err}");
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_add_alert_command() {
    let mock_server = test_utils::create_pair_server("USD", "NGN", 1650.0).await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), &mock_server.uri());

    let result = fxalert::run_command(
        fxalert::AppCommand::AddAlert(NewAlert {
            user_id: "user-1".into(),
            from_currency: "usd".into(),
            to_currency: "ngn".into(),
            target_rate: 1600.0,
            condition: AlertCondition::Above,
            recurring: false,
        }),
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "AddAlert failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_sweep_command_with_no_alerts() {
    let mock_server = test_utils::create_pair_server("USD", "NGN", 1650.0).await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), &mock_server.uri());

    let result = fxalert::run_command(
        fxalert::AppCommand::Sweep,
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Sweep failed with: {:?}", result.err());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_full_sweep_flow_with_mock() {
    let mock_server = test_utils::create_pair_server("USD", "NGN", 1650.0).await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), &mock_server.uri());
    let config = AppConfig::load_from_path(&config_path).unwrap();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rates = fxalert::build_rate_service(&config, clock.clone()).unwrap();
    let engine = fxalert::build_engine(&config, rates, clock).unwrap();

    let request = NewAlert {
        user_id: "user-1".into(),
        from_currency: "USD".into(),
        to_currency: "NGN".into(),
        target_rate: 1600.0,
        condition: AlertCondition::Above,
        recurring: false,
    };
    let hit = engine.create_alert(request.clone()).await.unwrap();
    let miss = engine
        .create_alert(NewAlert {
            target_rate: 1700.0,
            ..request
        })
        .await
        .unwrap();

    let summary = engine.check_and_trigger_alerts().await.unwrap();
    info!(?summary, "Sweep finished");
    assert_eq!(summary.checked, 2);
    assert_eq!(summary.triggered, 1);
    assert_eq!(summary.reactivated, 0);
    // one upstream call for both alerts on the pair
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);

    let alerts = engine.list_alerts(Some("user-1")).await.unwrap();
    let stored_hit = alerts.iter().find(|a| a.id == hit.id).unwrap();
    let stored_miss = alerts.iter().find(|a| a.id == miss.id).unwrap();
    assert!(!stored_hit.is_active);
    assert!(stored_hit.triggered_at.is_some());
    assert!(stored_miss.is_active);
    assert!(stored_miss.triggered_at.is_none());

    let audit = fs::read_to_string(config.data_dir().unwrap().join("audit.jsonl")).unwrap();
    let records: Vec<AuditRecord> = audit
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, "RATE_ALERT_TRIGGERED");
    assert_eq!(records[0].entity_id, hit.id.to_string());
    assert_eq!(records[0].metadata["current_rate"], 1650.0);

    // second sweep: rate comes from cache, triggered alert is not rechecked
    let summary = engine.check_and_trigger_alerts().await.unwrap();
    assert_eq!(summary.checked, 1);
    assert_eq!(summary.triggered, 0);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}
