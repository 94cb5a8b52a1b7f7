pub mod config;
pub mod market_data;
pub mod meta;
pub mod monitor;
