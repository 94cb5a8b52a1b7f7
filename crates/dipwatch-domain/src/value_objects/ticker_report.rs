use crate::value_objects::price_snapshot::PriceSnapshot;
use crate::value_objects::ticker::WatchedTicker;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerReport {
    pub ticker: WatchedTicker,
    pub snapshot: PriceSnapshot,
    pub breached: bool,
}
