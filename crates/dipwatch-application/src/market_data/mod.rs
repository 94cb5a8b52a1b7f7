use dipwatch_domain::repositories::market_data::PriceHistorySource;
use dipwatch_domain::services::snapshot::{derive_snapshot, PriceOrigin};
use dipwatch_domain::value_objects::price_snapshot::PriceSnapshot;
use tracing::info_span;

/// Fetches current price and all-time high for `symbol`.
///
/// Never fails: source errors and empty histories come back as a snapshot with
/// both prices missing, after being logged.
pub fn fetch_snapshot(source: &dyn PriceHistorySource, symbol: &str) -> PriceSnapshot {
    let span = info_span!("app.market_data.fetch_snapshot", symbol = %symbol);
    let _enter = span.enter();

    let history = match source.fetch_history(symbol) {
        Ok(history) => history,
        Err(err) => {
            metrics::counter!("dipwatch.app.market_data.fetch_failures_total", "stage" => "fetch")
                .increment(1);
            tracing::error!(error = %err, "failed to fetch market data");
            return PriceSnapshot::missing();
        }
    };

    match derive_snapshot(&history) {
        Ok((snapshot, origin)) => {
            match origin {
                PriceOrigin::LiveQuote => {}
                PriceOrigin::LastClose => {
                    tracing::warn!(
                        fallback_price = ?snapshot.current_price,
                        "live price not available, using last close price"
                    );
                }
                PriceOrigin::Unavailable => {
                    tracing::warn!("neither a live price nor a close price is available");
                }
            }
            tracing::info!(
                current_price = ?snapshot.current_price,
                historical_high = ?snapshot.historical_high,
                bars = history.bars.len(),
                "market data fetched"
            );
            snapshot
        }
        Err(err) => {
            metrics::counter!("dipwatch.app.market_data.fetch_failures_total", "stage" => "derive")
                .increment(1);
            tracing::error!(error = %err, "unusable market data");
            PriceSnapshot::missing()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fetch_snapshot;
    use chrono::NaiveDate;
    use dipwatch_domain::repositories::market_data::PriceHistorySource;
    use dipwatch_domain::value_objects::price_history::{DailyBar, PriceHistory};
    use dipwatch_domain::value_objects::price_snapshot::PriceSnapshot;

    struct StaticSource(Result<PriceHistory, String>);

    impl PriceHistorySource for StaticSource {
        fn fetch_history(&self, _symbol: &str) -> Result<PriceHistory, String> {
            self.0.clone()
        }
    }

    fn history(live_price: Option<f64>) -> PriceHistory {
        PriceHistory {
            symbol: "VOO".to_string(),
            live_price,
            bars: vec![DailyBar {
                date: NaiveDate::from_ymd_opt(2026, 10, 15).expect("date"),
                high: Some(620.0),
                close: Some(601.5),
            }],
        }
    }

    #[test]
    fn source_error_becomes_missing_snapshot() {
        let source = StaticSource(Err("connection refused".to_string()));
        assert_eq!(fetch_snapshot(&source, "VOO"), PriceSnapshot::missing());
    }

    #[test]
    fn empty_history_becomes_missing_snapshot() {
        let mut empty = history(Some(600.0));
        empty.bars.clear();
        let source = StaticSource(Ok(empty));
        assert_eq!(fetch_snapshot(&source, "VOO"), PriceSnapshot::missing());
    }

    #[test]
    fn missing_live_price_falls_back_to_close() {
        let source = StaticSource(Ok(history(None)));
        let snapshot = fetch_snapshot(&source, "VOO");
        assert_eq!(snapshot.current_price, Some(601.5));
        assert_eq!(snapshot.historical_high, Some(620.0));
    }
}
