#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use marketlens::domain::analysis::AnalysisBundle;
use marketlens::domain::error::MarketLensError;
use marketlens::domain::news::NewsArticle;
pub use marketlens::domain::ohlcv::OhlcvBar;
use marketlens::domain::quote::FinancialSnapshot;
use marketlens::ports::cache_port::CachePort;
use marketlens::ports::market_data_port::MarketDataPort;
use marketlens::ports::news_port::NewsPort;
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};

/// Market data keyed by symbol, with a call counter so tests can assert
/// that no fetch happened.
pub struct MockMarketPort {
    pub quotes: HashMap<String, FinancialSnapshot>,
    pub bars: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub calls: Cell<usize>,
}

impl MockMarketPort {
    pub fn new() -> Self {
        Self {
            quotes: HashMap::new(),
            bars: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    pub fn with_quote(mut self, quote: FinancialSnapshot) -> Self {
        self.quotes.insert(quote.symbol.clone(), quote);
        self
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    fn check(&self, symbol: &str) -> Result<(), MarketLensError> {
        self.calls.set(self.calls.get() + 1);
        match self.errors.get(symbol) {
            Some(reason) => Err(MarketLensError::Api {
                provider: "mock".into(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl MarketDataPort for MockMarketPort {
    fn fetch_quote(&self, symbol: &str) -> Result<FinancialSnapshot, MarketLensError> {
        self.check(symbol)?;
        self.quotes
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketLensError::no_data(symbol))
    }

    fn fetch_history(
        &self,
        symbol: &str,
        _range: &str,
        _interval: &str,
    ) -> Result<Vec<OhlcvBar>, MarketLensError> {
        self.check(symbol)?;
        self.bars
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketLensError::no_data(symbol))
    }
}

pub struct MockNewsPort {
    pub articles: Vec<NewsArticle>,
    pub error: Option<String>,
    pub queries: std::cell::RefCell<Vec<String>>,
}

impl MockNewsPort {
    pub fn new(titles: &[&str]) -> Self {
        Self {
            articles: titles.iter().enumerate().map(|(i, t)| article(i, t)).collect(),
            error: None,
            queries: std::cell::RefCell::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            error: Some(reason.to_string()),
            ..Self::new(&[])
        }
    }

    pub fn calls(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl NewsPort for MockNewsPort {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<NewsArticle>, MarketLensError> {
        self.queries.borrow_mut().push(query.to_string());
        if let Some(reason) = &self.error {
            return Err(MarketLensError::Api {
                provider: "mock".into(),
                reason: reason.clone(),
            });
        }
        Ok(self.articles.iter().take(limit).cloned().collect())
    }
}

/// In-memory cache for orchestration tests.
#[derive(Default)]
pub struct MemoryCache {
    pub entries: BTreeMap<String, AnalysisBundle>,
    pub puts: usize,
}

impl CachePort for MemoryCache {
    fn get(&self, ticker: &str) -> Result<Option<AnalysisBundle>, MarketLensError> {
        Ok(self.entries.get(ticker).cloned())
    }

    fn put(&mut self, bundle: &AnalysisBundle) -> Result<(), MarketLensError> {
        self.puts += 1;
        self.entries.insert(bundle.ticker.clone(), bundle.clone());
        Ok(())
    }

    fn remove(&mut self, ticker: &str) -> Result<bool, MarketLensError> {
        Ok(self.entries.remove(ticker).is_some())
    }

    fn clear(&mut self) -> Result<(), MarketLensError> {
        self.entries.clear();
        Ok(())
    }

    fn tickers(&self) -> Result<Vec<String>, MarketLensError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

pub fn article(i: usize, title: &str) -> NewsArticle {
    NewsArticle {
        title: title.to_string(),
        url: format!("https://news.example.com/{i}"),
        source: Some("Example Wire".to_string()),
        published_at: None,
        description: None,
    }
}

pub fn quote(symbol: &str, price: f64, previous_close: f64) -> FinancialSnapshot {
    FinancialSnapshot {
        current_price: Some(price),
        previous_close: Some(previous_close),
        ..FinancialSnapshot::new(symbol)
    }
}

/// Daily bars starting 2024-01-01 with the given closes.
pub fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            date: start + Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000 + i as i64,
        })
        .collect()
}

/// A zig-zag uptrend long enough for every default indicator.
pub fn trending_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + i as f64 * 0.5 + if i % 2 == 0 { 1.0 } else { -1.0 })
        .collect()
}
