use super::common::{self, yes_no};
use chrono::Datelike;
use dipwatch_application::config::{load_config, Config};
use dipwatch_domain::services::calendar::{
    is_federal_holiday, is_last_trading_day_of_month_in, is_session, is_trading_day,
    last_session_of_month, MonthEndWindow,
};
use std::path::{Path, PathBuf};

pub(super) fn run_calendar(
    config_path: Option<PathBuf>,
    date: Option<String>,
    at: Option<String>,
) -> Result<(), String> {
    let window = resolve_window(config_path.as_deref())?;
    let clock = common::resolve_clock(at.as_deref())?;
    let today = match date.as_deref() {
        Some(value) => common::parse_date(value)?,
        None => clock.today,
    };

    println!("date: {} ({})", today, today.weekday());
    println!(
        "trading day: {} (federal holiday: {})",
        yes_no(is_trading_day(today)),
        yes_no(is_federal_holiday(today))
    );
    println!("nyse session: {}", yes_no(is_session(today)));
    match last_session_of_month(today.year(), today.month()) {
        Some(last) => println!("last session of month: {}", last),
        None => println!("last session of month: none"),
    }
    println!(
        "month-end window: before {:02}:00 UTC on the last session, before {:02}:00 UTC on any day",
        window.morning_cutoff_hour_utc, window.force_window_end_hour_utc
    );
    println!(
        "month-end summary due at {}: {}",
        clock.now_utc.to_rfc3339(),
        yes_no(is_last_trading_day_of_month_in(today, clock.now_utc, window))
    );
    Ok(())
}

/// Same windows `run` would use for this config.
fn resolve_window(config_path: Option<&Path>) -> Result<MonthEndWindow, String> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    config.validate()?;
    Ok(config.month_end_window())
}
