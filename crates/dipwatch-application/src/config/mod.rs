use dipwatch_domain::services::calendar::{
    MonthEndWindow, DEFAULT_FORCE_WINDOW_END_HOUR_UTC, DEFAULT_MORNING_CUTOFF_HOUR_UTC,
};
use dipwatch_domain::value_objects::ticker::WatchedTicker;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const DEFAULT_API_KEY_ENV: &str = "DIPWATCH_MAIL_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub tickers: Vec<TickerConfig>,
    #[serde(default)]
    pub market_data: MarketDataConfig,
    pub mail: Option<MailConfig>,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TickerConfig {
    pub symbol: String,
    pub threshold: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct MarketDataConfig {
    #[serde(default = "default_market_data_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    #[serde(default = "default_mail_api_url")]
    pub api_base_url: String,
    pub domain: String,
    pub from: String,
    pub to: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    #[serde(default = "default_morning_cutoff")]
    pub morning_cutoff_hour_utc: u32,
    #[serde(default = "default_force_window_end")]
    pub force_window_end_hour_utc: u32,
}

fn default_market_data_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_mail_api_url() -> String {
    "https://api.mailgun.net".to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_user_agent() -> String {
    format!("Mozilla/5.0 (compatible; dipwatch/{})", crate::meta::app_version())
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_retries() -> u32 {
    1
}

fn default_morning_cutoff() -> u32 {
    DEFAULT_MORNING_CUTOFF_HOUR_UTC
}

fn default_force_window_end() -> u32 {
    DEFAULT_FORCE_WINDOW_END_HOUR_UTC
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: default_market_data_url(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            morning_cutoff_hour_utc: default_morning_cutoff(),
            force_window_end_hour_utc: default_force_window_end(),
        }
    }
}

impl Default for Config {
    /// Built-in watchlist without mail delivery settings.
    fn default() -> Self {
        Self {
            tickers: vec![
                TickerConfig {
                    symbol: "VOO".to_string(),
                    threshold: 0.95,
                },
                TickerConfig {
                    symbol: "VGT".to_string(),
                    threshold: 0.9483,
                },
                TickerConfig {
                    symbol: "MGK".to_string(),
                    threshold: 0.9407,
                },
            ],
            market_data: MarketDataConfig::default(),
            mail: None,
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Config {
    /// Validated tickers in configured order.
    pub fn watchlist(&self) -> Result<Vec<WatchedTicker>, String> {
        if self.tickers.is_empty() {
            return Err("config must list at least one ticker".to_string());
        }
        let mut seen = HashSet::new();
        let mut watchlist = Vec::with_capacity(self.tickers.len());
        for entry in &self.tickers {
            let ticker = WatchedTicker::new(&entry.symbol, entry.threshold)?;
            if !seen.insert(ticker.symbol.clone()) {
                return Err(format!("duplicate ticker symbol: {}", ticker.symbol));
            }
            watchlist.push(ticker);
        }
        Ok(watchlist)
    }

    pub fn month_end_window(&self) -> MonthEndWindow {
        MonthEndWindow {
            morning_cutoff_hour_utc: self.schedule.morning_cutoff_hour_utc,
            force_window_end_hour_utc: self.schedule.force_window_end_hour_utc,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.watchlist()?;

        if self.market_data.base_url.trim().is_empty() {
            return Err("market_data.base_url must not be empty".to_string());
        }
        if self.market_data.timeout_secs == 0 {
            return Err("market_data.timeout_secs must be > 0".to_string());
        }

        if let Some(mail) = &self.mail {
            for (name, value) in [
                ("mail.api_base_url", &mail.api_base_url),
                ("mail.domain", &mail.domain),
                ("mail.from", &mail.from),
                ("mail.to", &mail.to),
                ("mail.api_key_env", &mail.api_key_env),
            ] {
                if value.trim().is_empty() {
                    return Err(format!("{name} must not be empty"));
                }
            }
            if mail.timeout_secs == 0 {
                return Err("mail.timeout_secs must be > 0".to_string());
            }
        }

        let schedule = &self.schedule;
        if schedule.morning_cutoff_hour_utc > 24 {
            return Err("schedule.morning_cutoff_hour_utc must be within 0..=24".to_string());
        }
        if schedule.force_window_end_hour_utc > 24 {
            return Err("schedule.force_window_end_hour_utc must be within 0..=24".to_string());
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read config {}: {}", path.display(), err))?;
    toml::from_str(&contents)
        .map_err(|err| format!("failed to parse TOML {}: {}", path.display(), err))
}

/// Renders the effective config, defaults included.
pub fn to_toml_pretty(config: &Config) -> Result<String, String> {
    toml::to_string_pretty(config)
        .map_err(|err| format!("failed to serialize config as TOML: {err}"))
}
