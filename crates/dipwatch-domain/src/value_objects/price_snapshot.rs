use serde::Serialize;

/// Prices for one ticker at fetch time. Either side may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PriceSnapshot {
    pub current_price: Option<f64>,
    pub historical_high: Option<f64>,
}

impl PriceSnapshot {
    pub fn new(current_price: Option<f64>, historical_high: Option<f64>) -> Self {
        Self {
            current_price,
            historical_high,
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.current_price.is_some() && self.historical_high.is_some()
    }

    /// Percentage below the historical high, e.g. `5.0` for a 5% drop.
    pub fn drop_pct(&self) -> Option<f64> {
        let (current, high) = (self.current_price?, self.historical_high?);
        drop_pct(current, high)
    }
}

pub fn drop_pct(current: f64, high: f64) -> Option<f64> {
    if !high.is_finite() || high <= 0.0 || !current.is_finite() {
        return None;
    }
    Some((high - current) / high * 100.0)
}
