pub mod mail;
pub mod market_data;
