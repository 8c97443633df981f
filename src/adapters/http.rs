//! Shared blocking HTTP plumbing for the provider adapters.

use crate::domain::error::MarketLensError;
use crate::domain::settings::HttpSettings;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Longest body excerpt carried into an error message.
const BODY_EXCERPT: usize = 200;

pub fn build_client(settings: &HttpSettings) -> Result<Client, MarketLensError> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.timeout)
        .build()
        .map_err(|e| MarketLensError::http("http client", e))
}

/// Status code and body of a completed request. Non-2xx statuses are not
/// errors at this level since providers put their error details in the body.
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn excerpt(&self) -> &str {
        let end = self
            .body
            .char_indices()
            .nth(BODY_EXCERPT)
            .map_or(self.body.len(), |(i, _)| i);
        &self.body[..end]
    }
}

pub fn get(
    client: &Client,
    provider: &str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<RawResponse, MarketLensError> {
    debug!(provider, url, "GET");
    let response = client
        .get(url)
        .query(query)
        .send()
        .map_err(|e| MarketLensError::http(provider, e))?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .map_err(|e| MarketLensError::http(provider, e))?;
    debug!(provider, status, bytes = body.len(), "response");
    Ok(RawResponse { status, body })
}

pub fn parse_json<T: DeserializeOwned>(provider: &str, body: &str) -> Result<T, MarketLensError> {
    serde_json::from_str(body).map_err(|e| MarketLensError::malformed(provider, e.to_string()))
}

/// Error for a non-2xx response whose body carried nothing more specific.
pub fn status_error(provider: &str, response: &RawResponse) -> MarketLensError {
    MarketLensError::Api {
        provider: provider.to_string(),
        reason: format!("HTTP {}: {}", response.status, response.excerpt()),
    }
}
