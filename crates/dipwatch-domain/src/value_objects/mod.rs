pub mod alert;
pub mod email;
pub mod price_history;
pub mod price_snapshot;
pub mod ticker;
pub mod ticker_report;
