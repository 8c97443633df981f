//! Mutual fund NAV records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCHEME_CODE: &str = "102885";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundNav {
    pub scheme_code: String,
    pub fund_house: String,
    pub scheme_name: String,
    pub nav: f64,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundScheme {
    pub scheme_code: String,
    pub scheme_name: String,
}

/// Case-insensitive substring match on name or code, truncated to `limit`.
pub fn filter_schemes(
    schemes: Vec<FundScheme>,
    search: Option<&str>,
    limit: usize,
) -> Vec<FundScheme> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    schemes
        .into_iter()
        .filter(|s| match &needle {
            Some(n) => s.scheme_name.to_lowercase().contains(n) || s.scheme_code.contains(n),
            None => true,
        })
        .take(limit)
        .collect()
}
