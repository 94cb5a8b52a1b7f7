use super::common;
use dipwatch_application::config::{load_config, Config};
use dipwatch_application::monitor::{run_once, MonitorPlan, RunReport};
use std::path::PathBuf;

pub(super) fn run_check(
    config_path: Option<PathBuf>,
    dry_run: bool,
    at: Option<String>,
    json: bool,
) -> Result<(), String> {
    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    config.validate()?;
    if !json {
        common::print_config_summary("run", &config, config_path.as_deref());
    }

    let plan = MonitorPlan {
        tickers: config.watchlist()?,
        window: config.month_end_window(),
    };
    let clock = common::resolve_clock(at.as_deref())?;
    let crate::infra::RunDeps { market_data, mail } =
        crate::infra::build_run_deps(&config, dry_run)?;

    let report = run_once(&plan, &clock, market_data.as_ref(), mail.as_ref())?;

    if json {
        let line = serde_json::to_string(&report)
            .map_err(|err| format!("failed to serialize run report: {err}"))?;
        println!("{}", line);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    println!("as of {} (today={})", report.now_utc.to_rfc3339(), report.today);
    for entry in &report.tickers {
        let price = |value: Option<f64>| {
            value
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "n/a".to_string())
        };
        println!(
            "  {}: current={}, high={}, threshold={:.2}%, breached={}",
            entry.ticker.symbol,
            price(entry.snapshot.current_price),
            price(entry.snapshot.historical_high),
            entry.ticker.threshold.as_percent(),
            entry.breached
        );
    }
    match &report.sent {
        Some(sent) => println!(
            "decision: {} (sent \"{}\", id={})",
            report.decision.as_str(),
            sent.message.subject,
            sent.receipt
                .id
                .as_deref()
                .or(sent.receipt.message.as_deref())
                .unwrap_or("none")
        ),
        None => println!("decision: {}", report.decision.as_str()),
    }
}
