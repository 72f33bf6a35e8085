use super::ui;
use crate::core::rate::{Conversion, PairRate};
use crate::core::service::RateService;
use anyhow::Result;
use comfy_table::Cell;

pub fn render_rate(rate: &PairRate) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("Rate"),
        ui::header_cell("Fetched"),
        ui::header_cell("Expires"),
    ]);
    table.add_row(vec![
        Cell::new(format!("{}/{}", rate.from, rate.to)),
        ui::number_cell(rate.rate.to_string()),
        Cell::new(rate.fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        Cell::new(rate.expires_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
    ]);
    table.to_string()
}

pub fn render_conversion(conversion: &Conversion) -> String {
    format!(
        "{} {} = {} {}\n{}",
        conversion.amount,
        conversion.from,
        ui::style_text(&conversion.converted_amount.to_string(), ui::StyleType::Value),
        ui::style_text(conversion.to.as_str(), ui::StyleType::Label),
        ui::style_text(
            &format!(
                "rate {} as of {}",
                conversion.rate,
                conversion.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            ui::StyleType::Subtle
        )
    )
}

pub async fn show_rate(rates: &RateService, from: &str, to: &str) -> Result<()> {
    let rate = rates.get_rate(from, to).await?;
    println!("{}", render_rate(&rate));
    Ok(())
}

pub async fn show_conversion(rates: &RateService, from: &str, to: &str, amount: f64) -> Result<()> {
    let conversion = rates.convert(from, to, amount).await?;
    println!("{}", render_conversion(&conversion));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::CurrencyCode;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_render_conversion_contains_amounts() {
        console::set_colors_enabled(false);
        let fetched_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let conversion = Conversion {
            from: CurrencyCode::parse("NGN").unwrap(),
            to: CurrencyCode::parse("USD").unwrap(),
            amount: 25000.0,
            rate: 0.00062,
            converted_amount: 15.5,
            fetched_at,
            expires_at: fetched_at + Duration::minutes(10),
        };

        let output = render_conversion(&conversion);
        assert!(output.contains("25000 NGN = 15.5 USD"));
        assert!(output.contains("rate 0.00062 as of 2024-03-01 12:00:00 UTC"));
    }

    #[test]
    fn test_render_rate_table() {
        let fetched_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let rate = PairRate {
            from: CurrencyCode::parse("USD").unwrap(),
            to: CurrencyCode::parse("NGN").unwrap(),
            rate: 1650.5,
            fetched_at,
            expires_at: fetched_at + Duration::minutes(10),
        };

        let output = render_rate(&rate);
        assert!(output.contains("USD/NGN"));
        assert!(output.contains("1650.5"));
        assert!(output.contains("2024-03-01 12:10:00 UTC"));
    }
}
