use crate::value_objects::alert::AlertRecord;
use crate::value_objects::email::EmailMessage;
use crate::value_objects::ticker_report::TickerReport;
use chrono::NaiveDate;

fn format_price(price: Option<f64>) -> String {
    match price {
        Some(value) => format!("${value:.2}"),
        None => "n/a".to_string(),
    }
}

fn format_pct(pct: Option<f64>) -> String {
    match pct {
        Some(value) => format!("{value:.2}%"),
        None => "n/a".to_string(),
    }
}

pub fn alert_message(alerts: &[AlertRecord]) -> EmailMessage {
    let symbols: Vec<&str> = alerts.iter().map(AlertRecord::symbol).collect();
    let subject = format!("ETF price alert: {}", symbols.join(", "));

    let mut body = String::from("The following ETFs are trading below their alert threshold:\n\n");
    for alert in alerts {
        body.push_str(&format!(
            "{}: current {}, historical high {}, down {} (alert below {:.2}% of high)\n",
            alert.symbol(),
            format_price(Some(alert.current_price())),
            format_price(Some(alert.historical_high())),
            format_pct(alert.drop_pct()),
            alert.threshold().as_percent(),
        ));
    }

    EmailMessage { subject, body }
}

/// One line per configured ticker; tickers without data render as `n/a`.
pub fn monthly_summary_message(today: NaiveDate, reports: &[TickerReport]) -> EmailMessage {
    let subject = format!("ETF monthly summary for {}", today.format("%Y-%m-%d"));

    let mut body = format!(
        "Month-end snapshot as of {}:\n\n",
        today.format("%Y-%m-%d")
    );
    for report in reports {
        body.push_str(&format!(
            "{}: current {}, historical high {}, down {}\n",
            report.ticker.symbol,
            format_price(report.snapshot.current_price),
            format_price(report.snapshot.historical_high),
            format_pct(report.snapshot.drop_pct()),
        ));
    }

    EmailMessage { subject, body }
}
