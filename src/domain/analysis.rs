//! Analysis orchestration: snapshot, indicators, and headline sentiment for a
//! ticker, served from the cache unless a refresh is requested.

use crate::domain::error::MarketLensError;
use crate::domain::indicator::{IndicatorParams, IndicatorSnapshot};
use crate::domain::quote::FinancialSnapshot;
use crate::domain::sentiment::{HeadlineSentiment, SentimentAnalyzer};
use crate::domain::settings::Settings;
use crate::domain::symbol;
use crate::ports::cache_port::CachePort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::news_port::NewsPort;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisBundle {
    pub ticker: String,
    pub snapshot: FinancialSnapshot,
    pub indicators: IndicatorSnapshot,
    pub sentiment: Vec<HeadlineSentiment>,
    /// Why headlines are missing, when the news provider failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_error: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub history_range: String,
    pub interval: String,
    pub headline_limit: usize,
    pub sentiment_threshold: f64,
    pub indicators: IndicatorParams,
}

impl From<&Settings> for AnalysisOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            history_range: settings.market.history_range.clone(),
            interval: settings.market.interval.clone(),
            headline_limit: settings.news.limit,
            sentiment_threshold: settings.sentiment_threshold,
            indicators: settings.indicators.clone(),
        }
    }
}

/// The ports an analysis run reads from and writes to.
pub struct AnalysisPorts<'a> {
    pub market: &'a dyn MarketDataPort,
    pub news: &'a dyn NewsPort,
    pub cache: &'a mut dyn CachePort,
}

/// Returns the cached bundle for `ticker` unless `refresh` is set. Otherwise
/// computes a fresh bundle and stores it before returning. A market data
/// failure leaves the cache untouched; a news failure only empties the
/// headlines.
pub fn analyze(
    ticker: &str,
    ports: AnalysisPorts<'_>,
    options: &AnalysisOptions,
    refresh: bool,
) -> Result<AnalysisBundle, MarketLensError> {
    if !refresh {
        if let Some(bundle) = ports.cache.get(ticker)? {
            info!(ticker, generated_at = %bundle.generated_at, "serving cached analysis");
            return Ok(bundle);
        }
    }

    let bundle = compute_bundle(ticker, ports.market, ports.news, options)?;
    ports.cache.put(&bundle)?;
    info!(ticker, "analysis cached");
    Ok(bundle)
}

/// Fetches everything for `ticker` and computes a bundle without touching any
/// cache. News is best effort: on failure the bundle carries no headlines and
/// records the error.
pub fn compute_bundle(
    ticker: &str,
    market: &dyn MarketDataPort,
    news: &dyn NewsPort,
    options: &AnalysisOptions,
) -> Result<AnalysisBundle, MarketLensError> {
    let mut snapshot = market.fetch_quote(ticker)?.with_derived_change();
    if snapshot.name.is_none() {
        snapshot.name = symbol::company_name(ticker).map(str::to_string);
    }

    let bars = market.fetch_history(ticker, &options.history_range, &options.interval)?;
    debug!(ticker, bars = bars.len(), "history loaded");
    let indicators = IndicatorSnapshot::compute(&bars, &options.indicators);
    if !indicators.is_complete() {
        debug!(
            ticker,
            bars = bars.len(),
            needed = options.indicators.min_bars(),
            "history too short for every indicator"
        );
    }

    let query = headline_query(ticker, snapshot.name.as_deref());
    let (sentiment, news_error) = match news.search(&query, options.headline_limit) {
        Ok(articles) => (
            SentimentAnalyzer::new().score_articles(&articles, options.sentiment_threshold),
            None,
        ),
        Err(e) => {
            warn!(ticker, error = %e, "headlines unavailable");
            (Vec::new(), Some(e.to_string()))
        }
    };

    Ok(AnalysisBundle {
        ticker: ticker.to_string(),
        snapshot,
        indicators,
        sentiment,
        news_error,
        generated_at: Utc::now(),
    })
}

/// Company name when known, else the symbol without its exchange suffix.
pub fn headline_query(ticker: &str, name: Option<&str>) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => ticker.split('.').next().unwrap_or(ticker).to_string(),
    }
}
