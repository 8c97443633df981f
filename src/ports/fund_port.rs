//! Mutual fund registry port trait.

use crate::domain::error::MarketLensError;
use crate::domain::fund::{FundNav, FundScheme};

pub trait FundPort {
    fn fetch_nav(&self, scheme_code: &str) -> Result<FundNav, MarketLensError>;

    fn list_schemes(&self) -> Result<Vec<FundScheme>, MarketLensError>;
}
