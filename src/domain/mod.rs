//! Core domain types and logic.

pub mod analysis;
pub mod error;
pub mod fund;
pub mod indicator;
pub mod movers;
pub mod news;
pub mod ohlcv;
pub mod quote;
pub mod sentiment;
pub mod settings;
pub mod symbol;
