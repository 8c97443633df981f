//! Domain error types.

/// Top-level error type for marketlens.
#[derive(Debug, thiserror::Error)]
pub enum MarketLensError {
    #[error("http request to {provider} failed: {reason}")]
    Http { provider: String, reason: String },

    #[error("{provider} returned an error: {reason}")]
    Api { provider: String, reason: String },

    #[error("malformed response from {provider}: {reason}")]
    MalformedResponse { provider: String, reason: String },

    #[error("no data for {subject}")]
    NoData { subject: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("cache file {path} is corrupt: {reason}")]
    CacheCorrupt { path: String, reason: String },

    #[error("cache error: {reason}")]
    Cache { reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MarketLensError {
    pub fn http(provider: &str, err: impl std::fmt::Display) -> Self {
        MarketLensError::Http {
            provider: provider.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn malformed(provider: &str, reason: impl Into<String>) -> Self {
        MarketLensError::MalformedResponse {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    pub fn no_data(subject: impl Into<String>) -> Self {
        MarketLensError::NoData {
            subject: subject.into(),
        }
    }
}

impl From<&MarketLensError> for std::process::ExitCode {
    fn from(err: &MarketLensError) -> Self {
        let code: u8 = match err {
            MarketLensError::Io(_) | MarketLensError::Json(_) | MarketLensError::Csv(_) => 1,
            MarketLensError::ConfigParse { .. }
            | MarketLensError::ConfigMissing { .. }
            | MarketLensError::ConfigInvalid { .. } => 2,
            MarketLensError::Http { .. }
            | MarketLensError::Api { .. }
            | MarketLensError::MalformedResponse { .. } => 3,
            MarketLensError::CacheCorrupt { .. } | MarketLensError::Cache { .. } => 4,
            MarketLensError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
