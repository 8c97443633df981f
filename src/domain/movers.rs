//! Market overview: benchmark index levels plus the top gainers and losers
//! across a watchlist.

use crate::domain::quote::FinancialSnapshot;
use crate::domain::symbol;
use crate::ports::market_data_port::MarketDataPort;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::warn;

pub const DEFAULT_MOVERS_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketMovers {
    pub gainers: Vec<FinancialSnapshot>,
    pub losers: Vec<FinancialSnapshot>,
}

/// Level of a benchmark index against its previous close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexLevel {
    pub symbol: String,
    pub name: Option<String>,
    pub value: f64,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}

impl IndexLevel {
    /// `None` when the quote carries no price.
    pub fn from_quote(quote: FinancialSnapshot) -> Option<Self> {
        let quote = quote.with_derived_change();
        let value = quote.current_price?;
        Some(Self {
            name: quote
                .name
                .or_else(|| symbol::company_name(&quote.symbol).map(str::to_string)),
            symbol: quote.symbol,
            value,
            change: quote.change,
            change_percent: quote.change_percent,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    pub indices: Vec<IndexLevel>,
    #[serde(flatten)]
    pub movers: MarketMovers,
}

/// Splits quotes by sign of `change_percent`. Gainers are sorted descending,
/// losers ascending, each truncated to `limit`. Flat quotes and quotes
/// without a change are in neither list.
pub fn rank_movers(quotes: Vec<FinancialSnapshot>, limit: usize) -> MarketMovers {
    let mut gainers = Vec::new();
    let mut losers = Vec::new();

    for quote in quotes {
        match quote.change_percent {
            Some(pct) if pct > 0.0 => gainers.push(quote),
            Some(pct) if pct < 0.0 => losers.push(quote),
            _ => {}
        }
    }

    gainers.sort_by(|a, b| cmp_change(b, a));
    losers.sort_by(cmp_change);
    gainers.truncate(limit);
    losers.truncate(limit);

    MarketMovers { gainers, losers }
}

/// Quotes every symbol in `watchlist`, skipping the ones that fail, and ranks
/// the rest.
pub fn collect_movers(
    market: &dyn MarketDataPort,
    watchlist: &[String],
    limit: usize,
) -> MarketMovers {
    let quotes = watchlist
        .iter()
        .filter_map(|symbol| match market.fetch_quote(symbol) {
            Ok(quote) => Some(quote.with_derived_change()),
            Err(e) => {
                warn!(symbol = symbol.as_str(), error = %e, "skipping quote");
                None
            }
        })
        .collect();

    rank_movers(quotes, limit)
}

/// Quotes each index, skipping failures and quotes without a price. Order
/// follows `indices`.
pub fn collect_indices(market: &dyn MarketDataPort, indices: &[String]) -> Vec<IndexLevel> {
    indices
        .iter()
        .filter_map(|symbol| match market.fetch_quote(symbol) {
            Ok(quote) => IndexLevel::from_quote(quote),
            Err(e) => {
                warn!(symbol = symbol.as_str(), error = %e, "skipping index");
                None
            }
        })
        .collect()
}

pub fn market_overview(
    market: &dyn MarketDataPort,
    indices: &[String],
    watchlist: &[String],
    limit: usize,
) -> MarketOverview {
    MarketOverview {
        indices: collect_indices(market, indices),
        movers: collect_movers(market, watchlist, limit),
    }
}

fn cmp_change(a: &FinancialSnapshot, b: &FinancialSnapshot) -> Ordering {
    a.change_percent
        .partial_cmp(&b.change_percent)
        .unwrap_or(Ordering::Equal)
}
