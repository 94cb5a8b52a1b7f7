use serde::Serialize;

/// Fraction of the all-time high below which a ticker is considered breached.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() || value <= 0.0 || value >= 1.0 {
            return Err(format!("threshold must be inside (0, 1), got {value}"));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn as_percent(self) -> f64 {
        self.0 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchedTicker {
    pub symbol: String,
    pub threshold: Threshold,
}

impl WatchedTicker {
    pub fn new(symbol: &str, threshold: f64) -> Result<Self, String> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err("ticker symbol must not be empty".to_string());
        }
        if !symbol.chars().all(is_symbol_char) {
            return Err(format!(
                "ticker symbol may only contain A-Z, 0-9 and . ^ = -: {symbol}"
            ));
        }
        let threshold = Threshold::new(threshold).map_err(|err| format!("{symbol}: {err}"))?;
        Ok(Self { symbol, threshold })
    }
}

/// Exchange symbols such as `BRK-B`, `^GSPC`, `EURUSD=X` or `RDS.A`.
fn is_symbol_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '^' | '=' | '-')
}
