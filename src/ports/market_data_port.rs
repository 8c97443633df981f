//! Market data port trait.

use crate::domain::error::MarketLensError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::quote::FinancialSnapshot;

pub trait MarketDataPort {
    fn fetch_quote(&self, symbol: &str) -> Result<FinancialSnapshot, MarketLensError>;

    /// Daily (or `interval`) bars covering `range`, oldest first.
    fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<OhlcvBar>, MarketLensError>;
}
