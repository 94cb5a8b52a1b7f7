use crate::value_objects::alert::AlertRecord;
use crate::value_objects::price_snapshot::PriceSnapshot;
use crate::value_objects::ticker::{Threshold, WatchedTicker};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    breached: bool,
    current: Option<f64>,
    high: Option<f64>,
}

impl Evaluation {
    pub fn breached(&self) -> bool {
        self.breached
    }

    pub fn current(&self) -> Option<f64> {
        self.current
    }

    pub fn high(&self) -> Option<f64> {
        self.high
    }

    /// Alert for `ticker` when this evaluation breached; `None` otherwise.
    pub fn alert_for(&self, ticker: &WatchedTicker) -> Option<AlertRecord> {
        if !self.breached {
            return None;
        }
        let (current, high) = (self.current?, self.high?);
        Some(AlertRecord::new(
            ticker.symbol.clone(),
            current,
            high,
            ticker.threshold,
        ))
    }
}

/// Breached iff both prices are present and `current < threshold * high`.
pub fn evaluate(snapshot: &PriceSnapshot, threshold: Threshold) -> Evaluation {
    let breached = match (snapshot.current_price, snapshot.historical_high) {
        (Some(current), Some(high)) => current < threshold.value() * high,
        _ => false,
    };
    Evaluation {
        breached,
        current: snapshot.current_price,
        high: snapshot.historical_high,
    }
}
