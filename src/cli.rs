//! CLI definition and dispatch.
//!
//! Results go to stdout as pretty JSON (or CSV for `history --format csv`).
//! Failures are also reported on stdout, as `{"error": "..."}`, with a
//! nonzero exit code chosen by the error category.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::csv_adapter::{CsvHistoryAdapter, write_history_csv};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::http::build_client;
use crate::adapters::json_cache_adapter::JsonFileCache;
use crate::adapters::mfapi_adapter::MfApiAdapter;
use crate::adapters::newsapi_adapter::NewsApiAdapter;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::analysis::{self, AnalysisOptions, AnalysisPorts};
use crate::domain::error::MarketLensError;
use crate::domain::fund::filter_schemes;
use crate::domain::movers::{DEFAULT_MOVERS_LIMIT, market_overview};
use crate::domain::sentiment::SentimentAnalyzer;
use crate::domain::settings::{
    CacheBackend, CacheSettings, MarketProvider, Settings, validate_interval, validate_range,
};
use crate::domain::symbol;
use crate::ports::cache_port::CachePort;
use crate::ports::fund_port::FundPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::news_port::NewsPort;

#[derive(Parser, Debug)]
#[command(
    name = "marketlens",
    version,
    about = "Market quotes, technical indicators, headline sentiment and mutual fund NAVs"
)]
pub struct Cli {
    /// Optional INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter for stderr output; RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Current financial snapshot for a ticker
    Quote { ticker: Option<String> },
    /// Historical OHLCV bars
    History {
        ticker: Option<String>,
        #[arg(long, default_value = "1mo")]
        range: String,
        #[arg(long, default_value = "1d")]
        interval: String,
        #[arg(long, value_enum, default_value_t = HistoryFormat::Json)]
        format: HistoryFormat,
    },
    /// Recent headlines with sentiment
    News {
        ticker: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Latest NAV of a mutual fund scheme
    Nav { scheme_code: Option<String> },
    /// Search the mutual fund scheme registry
    Funds {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Snapshot, indicators and sentiment, cached per ticker
    Analyze {
        ticker: Option<String>,
        /// Recompute even when a cached result exists
        #[arg(long)]
        refresh: bool,
    },
    /// Benchmark indices plus top gainers and losers across the watchlist
    Movers {
        #[arg(long, default_value_t = DEFAULT_MOVERS_LIMIT)]
        limit: usize,
    },
    /// Inspect or modify the analysis cache
    Cache {
        #[command(subcommand)]
        action: CacheCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// List cached tickers
    List,
    /// Print a cached analysis
    Show { ticker: String },
    /// Drop one cached analysis
    Remove { ticker: String },
    /// Drop every cached analysis
    Clear,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFormat {
    Json,
    Csv,
}

/// What a command produced, ready to print.
#[derive(Debug, PartialEq)]
pub enum Output {
    Json(Value),
    Text(String),
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(&cli) {
        Ok(Output::Json(value)) => {
            println!("{}", pretty(&value));
            ExitCode::SUCCESS
        }
        Ok(Output::Text(text)) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "command failed");
            println!("{}", error_json(&e));
            (&e).into()
        }
    }
}

/// Runs the command without printing anything.
pub fn execute(cli: &Cli) -> Result<Output, MarketLensError> {
    let settings = load_settings(cli.config.as_ref())?;

    match &cli.command {
        Command::Quote { ticker } => {
            let ticker = resolve_ticker(&settings, ticker.as_deref());
            let market = market_port(&settings)?;
            let mut snapshot = market.fetch_quote(&ticker)?.with_derived_change();
            if snapshot.name.is_none() {
                snapshot.name = symbol::company_name(&ticker).map(str::to_string);
            }
            to_json(&snapshot)
        }
        Command::History {
            ticker,
            range,
            interval,
            format,
        } => {
            validate_range(range)?;
            validate_interval(interval)?;
            let ticker = resolve_ticker(&settings, ticker.as_deref());
            let bars = market_port(&settings)?.fetch_history(&ticker, range, interval)?;
            info!(ticker = ticker.as_str(), bars = bars.len(), "history fetched");
            match format {
                HistoryFormat::Json => to_json(&bars),
                HistoryFormat::Csv => {
                    let mut buf = Vec::new();
                    write_history_csv(&mut buf, &bars)?;
                    Ok(Output::Text(String::from_utf8_lossy(&buf).into_owned()))
                }
            }
        }
        Command::News { ticker, limit } => {
            let ticker = resolve_ticker(&settings, ticker.as_deref());
            let limit = limit.unwrap_or(settings.news.limit);
            let query = analysis::headline_query(&ticker, symbol::company_name(&ticker));
            let articles = news_port(&settings)?.search(&query, limit)?;
            let scored =
                SentimentAnalyzer::new().score_articles(&articles, settings.sentiment_threshold);
            Ok(Output::Json(json!({
                "ticker": ticker,
                "query": query,
                "headlines": scored,
            })))
        }
        Command::Nav { scheme_code } => {
            let code = scheme_code
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(settings.funds.default_scheme.as_str());
            to_json(&fund_port(&settings)?.fetch_nav(code)?)
        }
        Command::Funds { search, limit } => {
            let schemes = fund_port(&settings)?.list_schemes()?;
            to_json(&filter_schemes(schemes, search.as_deref(), *limit))
        }
        Command::Analyze { ticker, refresh } => {
            let ticker = resolve_ticker(&settings, ticker.as_deref());
            let market = market_port(&settings)?;
            let news = news_port(&settings)?;
            let mut cache = open_cache(&settings.cache)?;
            let bundle = analysis::analyze(
                &ticker,
                AnalysisPorts {
                    market: market.as_ref(),
                    news: &news,
                    cache: cache.as_mut(),
                },
                &AnalysisOptions::from(&settings),
                *refresh,
            )?;
            to_json(&bundle)
        }
        Command::Movers { limit } => {
            let market = market_port(&settings)?;
            to_json(&market_overview(
                market.as_ref(),
                &settings.market.indices,
                &settings.market.watchlist,
                *limit,
            ))
        }
        Command::Cache { action } => run_cache(action, &settings),
    }
}

fn run_cache(action: &CacheCommand, settings: &Settings) -> Result<Output, MarketLensError> {
    let mut cache = open_cache(&settings.cache)?;
    match action {
        CacheCommand::List => to_json(&cache.tickers()?),
        CacheCommand::Show { ticker } => {
            let ticker = resolve_ticker(settings, Some(ticker.as_str()));
            let bundle = cache
                .get(&ticker)?
                .ok_or_else(|| MarketLensError::no_data(format!("cached analysis of {ticker}")))?;
            to_json(&bundle)
        }
        CacheCommand::Remove { ticker } => {
            let ticker = resolve_ticker(settings, Some(ticker.as_str()));
            let removed = cache.remove(&ticker)?;
            Ok(Output::Json(json!({ "ticker": ticker, "removed": removed })))
        }
        CacheCommand::Clear => {
            cache.clear()?;
            Ok(Output::Json(json!({ "cleared": true })))
        }
    }
}

/// Reads the config file when given, otherwise runs on defaults. The
/// `NEWS_API_KEY` environment variable overrides the configured key.
pub fn load_settings(path: Option<&PathBuf>) -> Result<Settings, MarketLensError> {
    let adapter = match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path).map_err(|e| MarketLensError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?
        }
        None => FileConfigAdapter::empty(),
    };
    Ok(Settings::from_config(&adapter)?.with_env_overrides(|k| std::env::var(k).ok()))
}

pub fn market_port(settings: &Settings) -> Result<Box<dyn MarketDataPort>, MarketLensError> {
    match settings.market.provider {
        MarketProvider::Yahoo => Ok(Box::new(YahooAdapter::new(
            build_client(&settings.http)?,
            settings.market.base_url.as_str(),
        ))),
        MarketProvider::Csv => Ok(Box::new(CsvHistoryAdapter::new(
            settings.market.csv_dir.clone(),
        ))),
    }
}

fn news_port(settings: &Settings) -> Result<NewsApiAdapter, MarketLensError> {
    Ok(NewsApiAdapter::new(build_client(&settings.http)?, &settings.news))
}

fn fund_port(settings: &Settings) -> Result<MfApiAdapter, MarketLensError> {
    Ok(MfApiAdapter::new(
        build_client(&settings.http)?,
        settings.funds.base_url.as_str(),
    ))
}

pub fn open_cache(settings: &CacheSettings) -> Result<Box<dyn CachePort>, MarketLensError> {
    match settings.backend {
        CacheBackend::Json => Ok(Box::new(JsonFileCache::open(settings.path.clone())?)),
        #[cfg(feature = "sqlite")]
        CacheBackend::Sqlite => Ok(Box::new(
            crate::adapters::sqlite_cache_adapter::SqliteCache::open(&settings.path)?,
        )),
        #[cfg(not(feature = "sqlite"))]
        CacheBackend::Sqlite => Err(MarketLensError::ConfigInvalid {
            section: "cache".into(),
            key: "backend".into(),
            reason: "built without the sqlite feature".into(),
        }),
    }
}

fn resolve_ticker(settings: &Settings, ticker: Option<&str>) -> String {
    match ticker.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => settings.market.normalize(t),
        None => settings.market.default_ticker.clone(),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Output, MarketLensError> {
    Ok(Output::Json(serde_json::to_value(value)?))
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn error_json(err: &MarketLensError) -> String {
    pretty(&json!({ "error": err.to_string() }))
}
