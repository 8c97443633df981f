//! NewsAPI headline search adapter.

use crate::adapters::http;
use crate::domain::error::MarketLensError;
use crate::domain::news::NewsArticle;
use crate::domain::settings::NewsSettings;
use crate::ports::news_port::NewsPort;
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

const PROVIDER: &str = "newsapi";

/// Placeholder title NewsAPI uses for articles pulled by the publisher.
const REMOVED_TITLE: &str = "[Removed]";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    message: Option<String>,
    code: Option<String>,
    #[serde(default)]
    articles: Vec<ArticleRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleRecord {
    source: Option<SourceRecord>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct SourceRecord {
    name: Option<String>,
}

impl ArticleRecord {
    fn into_article(self) -> Option<NewsArticle> {
        let title = self.title.filter(|t| !t.trim().is_empty() && t != REMOVED_TITLE)?;
        let url = self.url.filter(|u| !u.trim().is_empty())?;
        Some(NewsArticle {
            title,
            url,
            source: self.source.and_then(|s| s.name),
            published_at: self.published_at,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

pub struct NewsApiAdapter {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    language: String,
    sort_by: String,
}

impl NewsApiAdapter {
    pub fn new(client: Client, settings: &NewsSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            language: settings.language.clone(),
            sort_by: settings.sort_by.clone(),
        }
    }
}

impl NewsPort for NewsApiAdapter {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<NewsArticle>, MarketLensError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MarketLensError::ConfigMissing {
                section: "news".to_string(),
                key: "api_key".to_string(),
            })?;

        info!(query, limit, "searching headlines");
        let page_size = limit.to_string();
        let url = format!("{}/v2/everything", self.base_url);
        let response = http::get(
            &self.client,
            PROVIDER,
            &url,
            &[
                ("q", query),
                ("language", &self.language),
                ("sortBy", &self.sort_by),
                ("pageSize", &page_size),
                ("apiKey", api_key),
            ],
        )?;

        let parsed: SearchResponse = match http::parse_json(PROVIDER, &response.body) {
            Ok(p) => p,
            Err(_) if !response.is_success() => return Err(http::status_error(PROVIDER, &response)),
            Err(e) => return Err(e),
        };

        if parsed.status != "ok" {
            let reason = match (parsed.code, parsed.message) {
                (Some(code), Some(message)) => format!("{code}: {message}"),
                (None, Some(message)) => message,
                (Some(code), None) => code,
                (None, None) => format!("status {}", parsed.status),
            };
            return Err(MarketLensError::Api {
                provider: PROVIDER.to_string(),
                reason,
            });
        }

        let total = parsed.articles.len();
        let articles: Vec<NewsArticle> = parsed
            .articles
            .into_iter()
            .filter_map(ArticleRecord::into_article)
            .take(limit)
            .collect();
        debug!(query, received = total, kept = articles.len(), "headlines parsed");
        Ok(articles)
    }
}
