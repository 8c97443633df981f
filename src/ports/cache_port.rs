//! Analysis cache port trait.

use crate::domain::analysis::AnalysisBundle;
use crate::domain::error::MarketLensError;

/// Ticker-keyed store of computed bundles. Last write wins and entries never
/// expire. Mutating calls are durable once they return `Ok`.
pub trait CachePort {
    fn get(&self, ticker: &str) -> Result<Option<AnalysisBundle>, MarketLensError>;

    fn put(&mut self, bundle: &AnalysisBundle) -> Result<(), MarketLensError>;

    /// Returns whether an entry was removed.
    fn remove(&mut self, ticker: &str) -> Result<bool, MarketLensError>;

    fn clear(&mut self) -> Result<(), MarketLensError>;

    /// Cached tickers in ascending order.
    fn tickers(&self) -> Result<Vec<String>, MarketLensError>;
}
