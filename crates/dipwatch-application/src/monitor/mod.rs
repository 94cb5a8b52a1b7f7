use crate::market_data::fetch_snapshot;
use chrono::{DateTime, NaiveDate, Utc};
use dipwatch_domain::repositories::mail::MailTransport;
use dipwatch_domain::repositories::market_data::PriceHistorySource;
use dipwatch_domain::services::calendar::{
    is_last_trading_day_of_month_in, is_trading_day, MonthEndWindow,
};
use dipwatch_domain::services::evaluator::evaluate;
use dipwatch_domain::services::notification::{alert_message, monthly_summary_message};
use dipwatch_domain::value_objects::alert::AlertRecord;
use dipwatch_domain::value_objects::email::{DeliveryReceipt, EmailMessage};
use dipwatch_domain::value_objects::ticker::WatchedTicker;
use dipwatch_domain::value_objects::ticker_report::TickerReport;
use serde::Serialize;
use tracing::info_span;

#[derive(Debug, Clone)]
pub struct MonitorPlan {
    pub tickers: Vec<WatchedTicker>,
    pub window: MonthEndWindow,
}

/// Wall clock of one run. `today` defaults to the UTC date of `now_utc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunClock {
    pub now_utc: DateTime<Utc>,
    pub today: NaiveDate,
}

impl RunClock {
    pub fn at(now_utc: DateTime<Utc>) -> Self {
        Self {
            now_utc,
            today: now_utc.date_naive(),
        }
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    MarketClosed,
    Alert,
    MonthlySummary,
    Quiet,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::MarketClosed => "market_closed",
            Decision::Alert => "alert",
            Decision::MonthlySummary => "monthly_summary",
            Decision::Quiet => "quiet",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SentMessage {
    pub message: EmailMessage,
    pub receipt: DeliveryReceipt,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub today: NaiveDate,
    pub now_utc: DateTime<Utc>,
    pub decision: Decision,
    pub tickers: Vec<TickerReport>,
    pub alerts: Vec<AlertRecord>,
    pub sent: Option<SentMessage>,
}

/// One pass of the monitor.
///
/// Only a mail delivery failure is an error; market data problems degrade to
/// missing prices for the affected ticker.
pub fn run_once(
    plan: &MonitorPlan,
    clock: &RunClock,
    market_data: &dyn PriceHistorySource,
    mail: &dyn MailTransport,
) -> Result<RunReport, String> {
    let span = info_span!(
        "app.monitor.run_once",
        today = %clock.today,
        now_utc = %clock.now_utc,
        tickers = plan.tickers.len()
    );
    let _enter = span.enter();

    if !is_trading_day(clock.today) {
        tracing::info!("not a trading day, nothing to do");
        return Ok(finish(clock, Decision::MarketClosed, Vec::new(), Vec::new(), None));
    }

    let mut reports = Vec::with_capacity(plan.tickers.len());
    let mut alerts = Vec::new();
    for ticker in &plan.tickers {
        let snapshot = fetch_snapshot(market_data, &ticker.symbol);
        let evaluation = evaluate(&snapshot, ticker.threshold);
        tracing::info!(
            symbol = %ticker.symbol,
            current_price = ?evaluation.current(),
            historical_high = ?evaluation.high(),
            threshold = ticker.threshold.value(),
            breached = evaluation.breached(),
            "ticker evaluated"
        );
        if let Some(alert) = evaluation.alert_for(ticker) {
            alerts.push(alert);
        }
        reports.push(TickerReport {
            ticker: ticker.clone(),
            snapshot,
            breached: evaluation.breached(),
        });
    }

    if !alerts.is_empty() {
        let message = alert_message(&alerts);
        let sent = deliver(mail, message, Decision::Alert)?;
        metrics::counter!("dipwatch.app.monitor.alerts_total").increment(alerts.len() as u64);
        return Ok(finish(clock, Decision::Alert, reports, alerts, Some(sent)));
    }

    if is_last_trading_day_of_month_in(clock.today, clock.now_utc, plan.window) {
        let message = monthly_summary_message(clock.today, &reports);
        let sent = deliver(mail, message, Decision::MonthlySummary)?;
        return Ok(finish(
            clock,
            Decision::MonthlySummary,
            reports,
            alerts,
            Some(sent),
        ));
    }

    tracing::info!("no breach and not month end, no notification sent");
    Ok(finish(clock, Decision::Quiet, reports, alerts, None))
}

fn deliver(
    mail: &dyn MailTransport,
    message: EmailMessage,
    decision: Decision,
) -> Result<SentMessage, String> {
    tracing::info!(kind = decision.as_str(), subject = %message.subject, "sending notification");
    let receipt = mail.send(&message).map_err(|err| {
        metrics::counter!("dipwatch.app.monitor.delivery_failures_total", "kind" => decision.as_str())
            .increment(1);
        format!("failed to send {} email: {err}", decision.as_str())
    })?;
    tracing::info!(id = ?receipt.id, "notification accepted");
    Ok(SentMessage { message, receipt })
}

fn finish(
    clock: &RunClock,
    decision: Decision,
    tickers: Vec<TickerReport>,
    alerts: Vec<AlertRecord>,
    sent: Option<SentMessage>,
) -> RunReport {
    metrics::counter!("dipwatch.app.monitor.runs_total", "decision" => decision.as_str())
        .increment(1);
    RunReport {
        today: clock.today,
        now_utc: clock.now_utc,
        decision,
        tickers,
        alerts,
        sent,
    }
}
