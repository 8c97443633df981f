//! Headline search port trait.

use crate::domain::error::MarketLensError;
use crate::domain::news::NewsArticle;

pub trait NewsPort {
    /// Most recent articles matching `query`, at most `limit`.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<NewsArticle>, MarketLensError>;
}
