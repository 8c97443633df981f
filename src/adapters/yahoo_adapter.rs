//! Yahoo Finance market data adapter.
//!
//! Quotes come from the v7 quote endpoint, history from the v8 chart endpoint.

use crate::adapters::http::{self, RawResponse};
use crate::domain::error::MarketLensError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::quote::FinancialSnapshot;
use crate::ports::market_data_port::MarketDataPort;
use chrono::DateTime;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

const PROVIDER: &str = "yahoo";

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<QuoteRecord>,
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteRecord {
    symbol: String,
    long_name: Option<String>,
    short_name: Option<String>,
    currency: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_previous_close: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<i64>,
    market_cap: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
}

impl From<QuoteRecord> for FinancialSnapshot {
    fn from(q: QuoteRecord) -> Self {
        FinancialSnapshot {
            symbol: q.symbol,
            name: q.long_name.or(q.short_name),
            currency: q.currency,
            current_price: q.regular_market_price,
            previous_close: q.regular_market_previous_close,
            change: q.regular_market_change,
            change_percent: q.regular_market_change_percent,
            day_high: q.regular_market_day_high,
            day_low: q.regular_market_day_low,
            volume: q.regular_market_volume,
            market_cap: q.market_cap,
            pe_ratio: q.trailing_pe,
            fifty_two_week_high: q.fifty_two_week_high,
            fifty_two_week_low: q.fifty_two_week_low,
        }
        .with_derived_change()
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartResponse,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    result: Option<Vec<ChartData>>,
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    code: String,
    description: String,
}

impl ProviderError {
    fn into_error(self, symbol: &str) -> MarketLensError {
        if self.code.eq_ignore_ascii_case("Not Found") {
            return MarketLensError::no_data(symbol);
        }
        MarketLensError::Api {
            provider: PROVIDER.to_string(),
            reason: format!("{}: {}", self.code, self.description),
        }
    }
}

pub struct YahooAdapter {
    client: Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn fetch(&self, path: &str, query: &[(&str, &str)]) -> Result<RawResponse, MarketLensError> {
        http::get(&self.client, PROVIDER, &format!("{}{}", self.base_url, path), query)
    }
}

impl MarketDataPort for YahooAdapter {
    fn fetch_quote(&self, symbol: &str) -> Result<FinancialSnapshot, MarketLensError> {
        info!(symbol, "fetching quote");
        let response = self.fetch("/v7/finance/quote", &[("symbols", symbol)])?;
        let envelope: QuoteEnvelope = match http::parse_json(PROVIDER, &response.body) {
            Ok(env) => env,
            Err(_) if !response.is_success() => return Err(http::status_error(PROVIDER, &response)),
            Err(e) => return Err(e),
        };

        if let Some(err) = envelope.quote_response.error {
            return Err(err.into_error(symbol));
        }
        if !response.is_success() {
            return Err(http::status_error(PROVIDER, &response));
        }

        envelope
            .quote_response
            .result
            .into_iter()
            .next()
            .map(FinancialSnapshot::from)
            .ok_or_else(|| MarketLensError::no_data(symbol))
    }

    fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<OhlcvBar>, MarketLensError> {
        info!(symbol, range, interval, "fetching history");
        let path = format!("/v8/finance/chart/{symbol}");
        let response = self.fetch(&path, &[("range", range), ("interval", interval)])?;
        let envelope: ChartEnvelope = match http::parse_json(PROVIDER, &response.body) {
            Ok(env) => env,
            Err(_) if !response.is_success() => return Err(http::status_error(PROVIDER, &response)),
            Err(e) => return Err(e),
        };

        if let Some(err) = envelope.chart.error {
            return Err(err.into_error(symbol));
        }
        if !response.is_success() {
            return Err(http::status_error(PROVIDER, &response));
        }

        let data = envelope
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| MarketLensError::no_data(symbol))?;

        let bars = chart_to_bars(data);
        if bars.is_empty() {
            return Err(MarketLensError::no_data(symbol));
        }
        debug!(symbol, bars = bars.len(), "history parsed");
        Ok(bars)
    }
}

/// Zips the parallel arrays of a chart result into bars. Points with any
/// missing price are dropped; a missing volume counts as zero.
fn chart_to_bars(data: ChartData) -> Vec<OhlcvBar> {
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
    let at = |v: &Vec<Option<f64>>, i: usize| v.get(i).copied().flatten();

    let mut bars: Vec<OhlcvBar> = data
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some(OhlcvBar {
                date,
                open: at(&quote.open, i)?,
                high: at(&quote.high, i)?,
                low: at(&quote.low, i)?,
                close: at(&quote.close, i)?,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            })
        })
        .collect();

    bars.sort_by_key(|b| b.date);
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::build_client;
    use crate::domain::settings::HttpSettings;
    use chrono::NaiveDate;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn adapter(server: &Server) -> YahooAdapter {
        let client = build_client(&HttpSettings {
            timeout: Duration::from_secs(5),
            user_agent: "Mozilla/5.0".into(),
        })
        .unwrap();
        YahooAdapter::new(client, server.url())
    }

    const QUOTE_BODY: &str = r#"{
        "quoteResponse": {
            "result": [{
                "symbol": "RELIANCE.NS",
                "longName": "Reliance Industries Limited",
                "shortName": "RELIANCE INDS",
                "currency": "INR",
                "regularMarketPrice": 2950.5,
                "regularMarketPreviousClose": 2900.0,
                "regularMarketDayHigh": 2960.0,
                "regularMarketDayLow": 2890.25,
                "regularMarketVolume": 5123456,
                "marketCap": 19960000000000,
                "trailingPE": 28.4,
                "fiftyTwoWeekHigh": 3024.9,
                "fiftyTwoWeekLow": 2220.3
            }],
            "error": null
        }
    }"#;

    // 2024-01-01 .. 2024-01-04 at 03:45 UTC, the NSE open.
    const CHART_BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "TCS.NS"},
                "timestamp": [1704080700, 1704167100, 1704253500, 1704339900],
                "indicators": {
                    "quote": [{
                        "open":   [100.0, 101.0, null, 103.0],
                        "high":   [102.0, 103.0, 104.0, 105.0],
                        "low":    [99.0, 100.0, 101.0, 102.0],
                        "close":  [101.0, 102.0, 103.0, 104.0],
                        "volume": [1000, null, 3000, 4000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn quote_maps_fields_and_derives_change() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/v7/finance/quote")
            .match_query(Matcher::UrlEncoded("symbols".into(), "RELIANCE.NS".into()))
            .with_header("content-type", "application/json")
            .with_body(QUOTE_BODY)
            .create();

        let snapshot = adapter(&server).fetch_quote("RELIANCE.NS").unwrap();

        mock.assert();
        assert_eq!(snapshot.symbol, "RELIANCE.NS");
        assert_eq!(snapshot.name.as_deref(), Some("Reliance Industries Limited"));
        assert_eq!(snapshot.currency.as_deref(), Some("INR"));
        assert_eq!(snapshot.current_price, Some(2950.5));
        assert_eq!(snapshot.volume, Some(5_123_456));
        assert_eq!(snapshot.pe_ratio, Some(28.4));
        assert_eq!(snapshot.change, Some(50.5));
        approx::assert_relative_eq!(
            snapshot.change_percent.unwrap(),
            50.5 / 2900.0 * 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn quote_empty_result_is_no_data() {
        let mut server = Server::new();
        server
            .mock("GET", "/v7/finance/quote")
            .match_query(Matcher::Any)
            .with_body(r#"{"quoteResponse": {"result": [], "error": null}}"#)
            .create();

        let err = adapter(&server).fetch_quote("NOPE.NS").unwrap_err();
        assert!(matches!(err, MarketLensError::NoData { ref subject } if subject == "NOPE.NS"));
    }

    #[test]
    fn quote_unauthorized_without_json_is_api_error() {
        let mut server = Server::new();
        server
            .mock("GET", "/v7/finance/quote")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("Unauthorized")
            .create();

        let err = adapter(&server).fetch_quote("TCS.NS").unwrap_err();
        match err {
            MarketLensError::Api { provider, reason } => {
                assert_eq!(provider, "yahoo");
                assert!(reason.contains("401"), "{reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn history_skips_incomplete_bars() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/v8/finance/chart/TCS.NS")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("range".into(), "1mo".into()),
                Matcher::UrlEncoded("interval".into(), "1d".into()),
            ]))
            .with_body(CHART_BODY)
            .create();

        let bars = adapter(&server).fetch_history("TCS.NS", "1mo", "1d").unwrap();

        mock.assert();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(bars[1].volume, 0);
        assert_eq!(bars[2].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(bars[2].close, 104.0);
    }

    #[test]
    fn history_not_found_is_no_data() {
        let mut server = Server::new();
        server
            .mock("GET", "/v8/finance/chart/FAKE.NS")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(
                r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#,
            )
            .create();

        let err = adapter(&server).fetch_history("FAKE.NS", "1mo", "1d").unwrap_err();
        assert!(matches!(err, MarketLensError::NoData { .. }));
    }

    #[test]
    fn history_provider_error_is_api_error() {
        let mut server = Server::new();
        server
            .mock("GET", "/v8/finance/chart/TCS.NS")
            .match_query(Matcher::Any)
            .with_status(422)
            .with_body(
                r#"{"chart": {"result": null, "error": {"code": "Unprocessable Entity", "description": "Invalid input - interval=2d is not supported"}}}"#,
            )
            .create();

        let err = adapter(&server).fetch_history("TCS.NS", "1mo", "2d").unwrap_err();
        match err {
            MarketLensError::Api { reason, .. } => assert!(reason.contains("interval=2d")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn history_garbage_body_is_malformed() {
        let mut server = Server::new();
        server
            .mock("GET", "/v8/finance/chart/TCS.NS")
            .match_query(Matcher::Any)
            .with_body("<html>oops</html>")
            .create();

        let err = adapter(&server).fetch_history("TCS.NS", "1mo", "1d").unwrap_err();
        assert!(matches!(err, MarketLensError::MalformedResponse { .. }));
    }
}
