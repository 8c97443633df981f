//! Typed runtime settings built from a [`ConfigPort`].
//!
//! Every key has a default, so an empty config yields a working setup. Values
//! that are present but unusable are rejected with `ConfigInvalid`.

use crate::domain::error::MarketLensError;
use crate::domain::fund::DEFAULT_SCHEME_CODE;
use crate::domain::indicator::IndicatorParams;
use crate::domain::news::DEFAULT_HEADLINE_LIMIT;
use crate::domain::sentiment::DEFAULT_THRESHOLD;
use crate::domain::symbol::{self, DEFAULT_TICKER};
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_NEWS_URL: &str = "https://newsapi.org";
pub const DEFAULT_FUNDS_URL: &str = "https://api.mfapi.in";
pub const DEFAULT_CACHE_FILE: &str = "stock_cache.json";
pub const DEFAULT_HISTORY_RANGE: &str = "6mo";
pub const DEFAULT_INTERVAL: &str = "1d";
pub const NEWS_API_KEY_ENV: &str = "NEWS_API_KEY";

const VALID_RANGES: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];
const VALID_INTERVALS: &[&str] = &[
    "1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h", "1d", "5d", "1wk", "1mo", "3mo",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketProvider {
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Json,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketSettings {
    pub provider: MarketProvider,
    pub base_url: String,
    pub default_ticker: String,
    pub history_range: String,
    pub interval: String,
    pub symbol_suffix: Option<String>,
    pub watchlist: Vec<String>,
    /// Benchmark indices quoted by `movers`.
    pub indices: Vec<String>,
    pub csv_dir: PathBuf,
}

impl MarketSettings {
    pub fn normalize(&self, raw: &str) -> String {
        symbol::normalize_symbol(raw, self.symbol_suffix.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub limit: usize,
    pub language: String,
    pub sort_by: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FundSettings {
    pub base_url: String,
    pub default_scheme: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub market: MarketSettings,
    pub news: NewsSettings,
    pub funds: FundSettings,
    pub cache: CacheSettings,
    pub http: HttpSettings,
    pub sentiment_threshold: f64,
    pub indicators: IndicatorParams,
}

impl Settings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, MarketLensError> {
        Ok(Settings {
            market: market_settings(config)?,
            news: news_settings(config)?,
            funds: FundSettings {
                base_url: string_or(config, "funds", "base_url", DEFAULT_FUNDS_URL),
                default_scheme: string_or(config, "funds", "default_scheme", DEFAULT_SCHEME_CODE),
            },
            cache: cache_settings(config)?,
            http: http_settings(config)?,
            sentiment_threshold: sentiment_threshold(config)?,
            indicators: indicator_params(config)?,
        })
    }

    /// Applies environment overrides. `lookup` is usually `std::env::var`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(NEWS_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.news.api_key = Some(key.trim().to_string());
        }
        self
    }
}

pub fn validate_range(range: &str) -> Result<(), MarketLensError> {
    if VALID_RANGES.contains(&range) {
        return Ok(());
    }
    Err(invalid(
        "market",
        "history_range",
        format!("unsupported range '{range}', expected one of {}", VALID_RANGES.join(", ")),
    ))
}

pub fn validate_interval(interval: &str) -> Result<(), MarketLensError> {
    if VALID_INTERVALS.contains(&interval) {
        return Ok(());
    }
    Err(invalid(
        "market",
        "interval",
        format!(
            "unsupported interval '{interval}', expected one of {}",
            VALID_INTERVALS.join(", ")
        ),
    ))
}

fn market_settings(config: &dyn ConfigPort) -> Result<MarketSettings, MarketLensError> {
    let provider = match string_or(config, "market", "provider", "yahoo")
        .to_lowercase()
        .as_str()
    {
        "yahoo" => MarketProvider::Yahoo,
        "csv" => MarketProvider::Csv,
        other => {
            return Err(invalid(
                "market",
                "provider",
                format!("unknown provider '{other}', expected yahoo or csv"),
            ));
        }
    };

    let symbol_suffix = config
        .get_string("market", "symbol_suffix")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let history_range = string_or(config, "market", "history_range", DEFAULT_HISTORY_RANGE);
    validate_range(&history_range)?;
    let interval = string_or(config, "market", "interval", DEFAULT_INTERVAL);
    validate_interval(&interval)?;

    let default_ticker = symbol::normalize_symbol(
        &string_or(config, "market", "default_ticker", DEFAULT_TICKER),
        symbol_suffix.as_deref(),
    );

    let watchlist = match config.get_string("market", "watchlist") {
        Some(s) if !s.trim().is_empty() => symbol::parse_symbols(&s, symbol_suffix.as_deref())
            .map_err(|e| invalid("market", "watchlist", e.to_string()))?,
        _ => symbol::default_watchlist(),
    };

    let indices = match config.get_string("market", "indices") {
        Some(s) if !s.trim().is_empty() => symbol::parse_symbols(&s, None)
            .map_err(|e| invalid("market", "indices", e.to_string()))?,
        _ => symbol::default_indices(),
    };

    Ok(MarketSettings {
        provider,
        base_url: string_or(config, "market", "base_url", DEFAULT_YAHOO_URL),
        default_ticker,
        history_range,
        interval,
        symbol_suffix,
        watchlist,
        indices,
        csv_dir: PathBuf::from(string_or(config, "csv", "path", "data")),
    })
}

fn news_settings(config: &dyn ConfigPort) -> Result<NewsSettings, MarketLensError> {
    let limit = positive(config, "news", "limit", DEFAULT_HEADLINE_LIMIT as i64)?;
    let api_key = config
        .get_string("news", "api_key")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Ok(NewsSettings {
        base_url: string_or(config, "news", "base_url", DEFAULT_NEWS_URL),
        api_key,
        limit,
        language: string_or(config, "news", "language", "en"),
        sort_by: string_or(config, "news", "sort_by", "publishedAt"),
    })
}

fn cache_settings(config: &dyn ConfigPort) -> Result<CacheSettings, MarketLensError> {
    let backend = match string_or(config, "cache", "backend", "json")
        .to_lowercase()
        .as_str()
    {
        "json" => CacheBackend::Json,
        "sqlite" => CacheBackend::Sqlite,
        other => {
            return Err(invalid(
                "cache",
                "backend",
                format!("unknown backend '{other}', expected json or sqlite"),
            ));
        }
    };

    Ok(CacheSettings {
        backend,
        path: PathBuf::from(string_or(config, "cache", "path", DEFAULT_CACHE_FILE)),
    })
}

fn http_settings(config: &dyn ConfigPort) -> Result<HttpSettings, MarketLensError> {
    let secs = positive(config, "http", "timeout_secs", 30)?;
    Ok(HttpSettings {
        timeout: Duration::from_secs(secs as u64),
        user_agent: string_or(config, "http", "user_agent", "Mozilla/5.0"),
    })
}

fn sentiment_threshold(config: &dyn ConfigPort) -> Result<f64, MarketLensError> {
    let value = double_or(config, "sentiment", "threshold", DEFAULT_THRESHOLD)?;
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "sentiment",
            "threshold",
            "threshold must be in [0, 1)".to_string(),
        ));
    }
    Ok(value)
}

fn indicator_params(config: &dyn ConfigPort) -> Result<IndicatorParams, MarketLensError> {
    let defaults = IndicatorParams::default();
    let macd_fast = positive(config, "indicators", "macd_fast", defaults.macd_fast as i64)?;
    let macd_slow = positive(config, "indicators", "macd_slow", defaults.macd_slow as i64)?;
    if macd_fast >= macd_slow {
        return Err(invalid(
            "indicators",
            "macd_fast",
            "macd_fast must be less than macd_slow".to_string(),
        ));
    }

    let mult = double_or(
        config,
        "indicators",
        "bollinger_mult",
        defaults.bollinger_mult_x100 as f64 / 100.0,
    )?;
    if !(mult > 0.0 && mult.is_finite()) {
        return Err(invalid(
            "indicators",
            "bollinger_mult",
            "bollinger_mult must be a positive number".to_string(),
        ));
    }

    Ok(IndicatorParams {
        rsi_period: positive(config, "indicators", "rsi_period", defaults.rsi_period as i64)?,
        macd_fast,
        macd_slow,
        macd_signal: positive(config, "indicators", "macd_signal", defaults.macd_signal as i64)?,
        bollinger_period: positive(
            config,
            "indicators",
            "bollinger_period",
            defaults.bollinger_period as i64,
        )?,
        bollinger_mult_x100: (mult * 100.0).round() as u32,
    })
}

fn string_or(config: &dyn ConfigPort, section: &str, key: &str, default: &str) -> String {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<usize, MarketLensError> {
    let value = config
        .get_int(section, key)
        .map_err(|e| invalid(section, key, e))?
        .unwrap_or(default);
    if value <= 0 {
        return Err(invalid(section, key, format!("{key} must be positive")));
    }
    Ok(value as usize)
}

fn double_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, MarketLensError> {
    Ok(config
        .get_double(section, key)
        .map_err(|e| invalid(section, key, e))?
        .unwrap_or(default))
}

fn invalid(section: &str, key: &str, reason: String) -> MarketLensError {
    MarketLensError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}
