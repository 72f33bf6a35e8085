use super::ui;
use crate::core::alert::{AlertId, NewAlert, RateAlert};
use crate::core::engine::AlertEngine;
use anyhow::Result;
use comfy_table::Cell;

pub fn render_alerts(alerts: &[RateAlert]) -> String {
    if alerts.is_empty() {
        return ui::style_text("No alerts configured", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("User"),
        ui::header_cell("Pair"),
        ui::header_cell("Condition"),
        ui::header_cell("Target"),
        ui::header_cell("Recurring"),
        ui::header_cell("Status"),
        ui::header_cell("Last Triggered"),
    ]);

    for alert in alerts {
        table.add_row(vec![
            Cell::new(alert.id),
            Cell::new(&alert.user_id),
            Cell::new(format!("{}/{}", alert.from_currency, alert.to_currency)),
            Cell::new(alert.condition),
            ui::number_cell(alert.target_rate.to_string()),
            Cell::new(if alert.recurring { "yes" } else { "no" }),
            ui::status_cell(alert.is_active),
            ui::format_optional_cell(alert.triggered_at, |t| {
                t.format("%Y-%m-%d %H:%M UTC").to_string()
            }),
        ]);
    }
    table.to_string()
}

pub async fn add_alert(engine: &AlertEngine, request: NewAlert) -> Result<()> {
    let alert = engine.create_alert(request).await?;
    println!(
        "Created alert {} for {}/{} {} {}",
        ui::style_text(&alert.id.to_string(), ui::StyleType::Label),
        alert.from_currency,
        alert.to_currency,
        alert.condition,
        alert.target_rate
    );
    Ok(())
}

pub async fn list_alerts(engine: &AlertEngine, user_id: Option<&str>) -> Result<()> {
    let alerts = engine.list_alerts(user_id).await?;
    println!("{}", render_alerts(&alerts));
    Ok(())
}

pub async fn remove_alert(engine: &AlertEngine, id: AlertId) -> Result<()> {
    if !engine.delete_alert(id).await? {
        anyhow::bail!("No alert with id {}", id);
    }
    println!("Removed alert {id}");
    Ok(())
}
