use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub high: Option<f64>,
    pub close: Option<f64>,
}

/// Raw market data for one symbol as returned by a price source.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    pub symbol: String,
    pub live_price: Option<f64>,
    pub bars: Vec<DailyBar>,
}
