//! mfapi.in mutual fund NAV adapter.

use crate::adapters::http;
use crate::domain::error::MarketLensError;
use crate::domain::fund::{FundNav, FundScheme};
use crate::ports::fund_port::FundPort;
use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{info, warn};

const PROVIDER: &str = "mfapi";
const NAV_DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Deserialize)]
struct SchemeResponse {
    #[serde(default)]
    meta: SchemeMeta,
    #[serde(default)]
    data: Vec<NavRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct SchemeMeta {
    fund_house: Option<String>,
    scheme_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NavRecord {
    date: String,
    nav: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemeListing {
    scheme_code: SchemeCode,
    scheme_name: String,
}

/// The registry has served scheme codes both as numbers and as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SchemeCode {
    Number(u64),
    Text(String),
}

impl From<SchemeCode> for String {
    fn from(code: SchemeCode) -> Self {
        match code {
            SchemeCode::Number(n) => n.to_string(),
            SchemeCode::Text(s) => s,
        }
    }
}

pub struct MfApiAdapter {
    client: Client,
    base_url: String,
}

impl MfApiAdapter {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl FundPort for MfApiAdapter {
    fn fetch_nav(&self, scheme_code: &str) -> Result<FundNav, MarketLensError> {
        info!(scheme_code, "fetching NAV");
        let url = format!("{}/mf/{}", self.base_url, scheme_code);
        let response = http::get(&self.client, PROVIDER, &url, &[])?;
        if !response.is_success() {
            return Err(http::status_error(PROVIDER, &response));
        }

        let parsed: SchemeResponse = http::parse_json(PROVIDER, &response.body)?;
        let latest = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| MarketLensError::no_data(format!("scheme {scheme_code}")))?;

        let nav = latest.nav.trim().parse::<f64>().map_err(|e| {
            MarketLensError::malformed(PROVIDER, format!("nav '{}': {e}", latest.nav))
        })?;
        let date = NaiveDate::parse_from_str(latest.date.trim(), NAV_DATE_FORMAT).ok();
        if date.is_none() {
            warn!(scheme_code, date = latest.date.as_str(), "unparseable NAV date");
        }

        Ok(FundNav {
            scheme_code: scheme_code.to_string(),
            fund_house: parsed.meta.fund_house.unwrap_or_default(),
            scheme_name: parsed.meta.scheme_name.unwrap_or_default(),
            nav,
            date,
        })
    }

    fn list_schemes(&self) -> Result<Vec<FundScheme>, MarketLensError> {
        info!("listing schemes");
        let url = format!("{}/mf", self.base_url);
        let response = http::get(&self.client, PROVIDER, &url, &[])?;
        if !response.is_success() {
            return Err(http::status_error(PROVIDER, &response));
        }

        let listings: Vec<SchemeListing> = http::parse_json(PROVIDER, &response.body)?;
        Ok(listings
            .into_iter()
            .map(|l| FundScheme {
                scheme_code: l.scheme_code.into(),
                scheme_name: l.scheme_name,
            })
            .collect())
    }
}
