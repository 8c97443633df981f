//! Port traits the domain depends on. Adapters implement them.

pub mod cache_port;
pub mod config_port;
pub mod fund_port;
pub mod market_data_port;
pub mod news_port;
