use crate::value_objects::price_snapshot::drop_pct;
use crate::value_objects::ticker::Threshold;
use serde::Serialize;

/// A breached ticker. Only built by the threshold evaluator, from complete prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    symbol: String,
    current_price: f64,
    historical_high: f64,
    threshold: Threshold,
}

impl AlertRecord {
    pub(crate) fn new(
        symbol: String,
        current_price: f64,
        historical_high: f64,
        threshold: Threshold,
    ) -> Self {
        Self {
            symbol,
            current_price,
            historical_high,
            threshold,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn historical_high(&self) -> f64 {
        self.historical_high
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// `None` when the high is not a positive finite price.
    pub fn drop_pct(&self) -> Option<f64> {
        drop_pct(self.current_price, self.historical_high)
    }
}
