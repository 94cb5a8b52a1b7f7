use chrono::{DateTime, NaiveDate, Utc};
use dipwatch_application::config::Config;
use dipwatch_application::meta::{app_name, app_version};
use dipwatch_application::monitor::RunClock;
use std::path::Path;

pub(super) fn print_config_summary(command: &str, config: &Config, source: Option<&Path>) {
    println!(
        "{} {} cli: {} (config={})",
        app_name(),
        app_version(),
        command,
        source
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in".to_string())
    );
    let tickers = config
        .tickers
        .iter()
        .map(|ticker| format!("{}@{}", ticker.symbol, ticker.threshold))
        .collect::<Vec<_>>()
        .join(", ");
    println!("tickers: {}", tickers);
    println!(
        "market_data: base_url={}, timeout_secs={}, retries={}",
        config.market_data.base_url, config.market_data.timeout_secs, config.market_data.retries
    );
    match &config.mail {
        Some(mail) => println!(
            "mail: api_base_url={}, domain={}, to={}, api_key=${}",
            mail.api_base_url, mail.domain, mail.to, mail.api_key_env
        ),
        None => println!("mail: none (only --dry-run can deliver)"),
    }
    println!(
        "schedule: morning_cutoff_hour_utc={}, force_window_end_hour_utc={}",
        config.schedule.morning_cutoff_hour_utc, config.schedule.force_window_end_hour_utc
    );
}

pub(super) fn parse_at(at: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(at.trim())
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| format!("invalid --at {at:?} (expected RFC 3339): {err}"))
}

pub(super) fn resolve_clock(at: Option<&str>) -> Result<RunClock, String> {
    match at {
        Some(value) => Ok(RunClock::at(parse_at(value)?)),
        None => Ok(RunClock::now()),
    }
}

pub(super) fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|err| format!("invalid --date {date:?} (expected YYYY-MM-DD): {err}"))
}

pub(super) fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
