use crate::value_objects::price_history::PriceHistory;
use crate::value_objects::price_snapshot::PriceSnapshot;
use serde::Serialize;

/// Where the current price of a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceOrigin {
    LiveQuote,
    LastClose,
    Unavailable,
}

fn usable(price: Option<f64>) -> Option<f64> {
    price.filter(|p| p.is_finite() && *p > 0.0)
}

/// Derives a snapshot from raw history: live quote first, last close as fallback,
/// and the maximum daily high over the whole history.
///
/// A history without a single usable high is an error ("no historical data").
pub fn derive_snapshot(history: &PriceHistory) -> Result<(PriceSnapshot, PriceOrigin), String> {
    let historical_high = history
        .bars
        .iter()
        .filter_map(|bar| usable(bar.high))
        .fold(None, |acc: Option<f64>, high| {
            Some(acc.map_or(high, |current| current.max(high)))
        });

    let Some(historical_high) = historical_high else {
        return Err(format!("no historical data found for {}", history.symbol));
    };

    if let Some(live) = usable(history.live_price) {
        return Ok((
            PriceSnapshot::new(Some(live), Some(historical_high)),
            PriceOrigin::LiveQuote,
        ));
    }

    let last_close = history.bars.iter().rev().find_map(|bar| usable(bar.close));
    let origin = if last_close.is_some() {
        PriceOrigin::LastClose
    } else {
        PriceOrigin::Unavailable
    };
    Ok((PriceSnapshot::new(last_close, Some(historical_high)), origin))
}
