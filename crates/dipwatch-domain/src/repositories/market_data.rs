use crate::value_objects::price_history::PriceHistory;

pub trait PriceHistorySource {
    fn fetch_history(&self, symbol: &str) -> Result<PriceHistory, String>;
}
