use chrono::{DateTime, Utc};
use dipwatch_domain::repositories::market_data::PriceHistorySource;
use dipwatch_domain::value_objects::price_history::{DailyBar, PriceHistory};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

impl ChartError {
    fn describe(&self) -> String {
        match self.description.as_deref() {
            Some(description) if !description.is_empty() => {
                format!("{} ({})", description, self.code)
            }
            _ => self.code.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Daily price history from the Yahoo Finance chart API.
pub struct YahooChartClient {
    pub base_url: String,
    pub timeout_secs: u64,
    pub retries: u32,
    client: Client,
}

impl YahooChartClient {
    pub fn new(
        base_url: String,
        timeout_secs: u64,
        retries: u32,
        user_agent: &str,
    ) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent.to_string())
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;
        Ok(Self {
            base_url,
            timeout_secs,
            retries,
            client,
        })
    }

    fn chart_endpoint(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            symbol
        )
    }
}

impl PriceHistorySource for YahooChartClient {
    fn fetch_history(&self, symbol: &str) -> Result<PriceHistory, String> {
        let endpoint = self.chart_endpoint(symbol);
        let span = tracing::info_span!(
            "infra.yahoo.fetch_history",
            symbol = %symbol,
            endpoint = %endpoint,
            timeout_secs = self.timeout_secs,
            retries = self.retries
        );
        let _enter = span.enter();

        let start = Instant::now();
        let mut attempts = 0u32;
        let mut last_status: Option<u16> = None;
        let mut last_error: Option<String> = None;

        while attempts <= self.retries {
            attempts += 1;
            if attempts > 1 {
                metrics::counter!("dipwatch.infra.market_data.retries_total").increment(1);
                tracing::debug!(attempt = attempts, "retrying market data request");
            }

            metrics::counter!("dipwatch.infra.market_data.requests_total").increment(1);
            let response = self
                .client
                .get(&endpoint)
                .query(&[("range", "max"), ("interval", "1d")])
                .send();
            match response {
                Ok(resp) => {
                    let status = resp.status();
                    last_status = Some(status.as_u16());
                    let body = match resp.text() {
                        Ok(body) => body,
                        Err(err) => {
                            last_error = Some(format!(
                                "failed to read market data response for {symbol}: {err}"
                            ));
                            if attempts <= self.retries {
                                continue;
                            }
                            break;
                        }
                    };

                    if status.is_success() {
                        metrics::histogram!("dipwatch.infra.market_data.call_ms")
                            .record(start.elapsed().as_millis() as f64);
                        return parse_chart_response(symbol, &body);
                    }

                    last_error = Some(match chart_error(&body) {
                        Some(error) => format!(
                            "market data error for {symbol}: {} (status {})",
                            error.describe(),
                            status.as_u16()
                        ),
                        None => format!(
                            "market data http error for {symbol}: status {}",
                            status.as_u16()
                        ),
                    });
                    if status.is_server_error() && attempts <= self.retries {
                        continue;
                    }
                    break;
                }
                Err(err) => {
                    last_error = Some(format!("market data request failed for {symbol}: {err}"));
                    if attempts <= self.retries {
                        continue;
                    }
                    break;
                }
            }
        }

        metrics::counter!("dipwatch.infra.market_data.errors_total").increment(1);
        tracing::warn!(
            attempts,
            status = ?last_status,
            error = last_error.as_deref().unwrap_or("unknown"),
            "market data request failed"
        );
        Err(last_error
            .unwrap_or_else(|| format!("market data request for {symbol} failed after retries")))
    }
}

fn chart_error(body: &str) -> Option<ChartError> {
    serde_json::from_str::<ChartEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.chart.error)
}

/// Parses a chart API payload into daily bars plus the live quote.
pub fn parse_chart_response(symbol: &str, body: &str) -> Result<PriceHistory, String> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|err| format!("failed to parse market data for {symbol}: {err}"))?;
    if let Some(error) = envelope.chart.error {
        return Err(format!(
            "market data error for {symbol}: {}",
            error.describe()
        ));
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| format!("no chart data returned for {symbol}"))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(idx, ts)| {
            let date = DateTime::<Utc>::from_timestamp(*ts, 0)?.date_naive();
            Some(DailyBar {
                date,
                high: quote.high.get(idx).copied().flatten(),
                close: quote.close.get(idx).copied().flatten(),
            })
        })
        .collect();

    Ok(PriceHistory {
        symbol: symbol.to_string(),
        live_price: result.meta.regular_market_price,
        bars,
    })
}
