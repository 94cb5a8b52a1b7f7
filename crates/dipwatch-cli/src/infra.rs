use dipwatch_application::config::Config;
use dipwatch_domain::repositories::mail::MailTransport;
use dipwatch_domain::repositories::market_data::PriceHistorySource;
use dipwatch_infrastructure::mail::log::LogMailTransport;
use dipwatch_infrastructure::mail::mailgun::MailgunTransport;
use dipwatch_infrastructure::market_data::yahoo::YahooChartClient;
use std::env;

pub struct RunDeps {
    pub market_data: Box<dyn PriceHistorySource>,
    pub mail: Box<dyn MailTransport>,
}

/// Builds every adapter up front so configuration errors surface before any network call.
pub fn build_run_deps(config: &Config, dry_run: bool) -> Result<RunDeps, String> {
    Ok(RunDeps {
        market_data: build_market_data(config)?,
        mail: build_mail(config, dry_run)?,
    })
}

fn build_market_data(config: &Config) -> Result<Box<dyn PriceHistorySource>, String> {
    let market_data = &config.market_data;
    let client = YahooChartClient::new(
        market_data.base_url.clone(),
        market_data.timeout_secs,
        market_data.retries,
        &market_data.user_agent,
    )
    .map_err(|err| {
        format!(
            "failed to init market data client (url={}): {err}",
            market_data.base_url
        )
    })?;
    Ok(Box::new(client))
}

fn build_mail(config: &Config, dry_run: bool) -> Result<Box<dyn MailTransport>, String> {
    if dry_run {
        return Ok(Box::new(LogMailTransport));
    }

    let mail = config.mail.as_ref().ok_or_else(|| {
        "missing [mail] section in config (pass --dry-run to skip delivery)".to_string()
    })?;
    let api_key = resolve_api_key(&mail.api_key_env)?;
    let transport = MailgunTransport::new(
        mail.api_base_url.clone(),
        mail.domain.clone(),
        mail.from.clone(),
        mail.to.clone(),
        api_key,
        mail.timeout_secs,
    )
    .map_err(|err| {
        format!(
            "failed to init mail transport (url={}): {err}",
            mail.api_base_url
        )
    })?;
    Ok(Box::new(transport))
}

/// The mail API key only ever comes from the environment.
pub fn resolve_api_key(env_name: &str) -> Result<String, String> {
    match env::var(env_name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(format!(
            "env {env_name} is not set; the mail API key must be supplied externally"
        )),
    }
}
