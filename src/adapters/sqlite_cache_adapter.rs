//! SQLite-backed analysis cache.

use crate::domain::analysis::AnalysisBundle;
use crate::domain::error::MarketLensError;
use crate::ports::cache_port::CachePort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, params};
use std::path::Path;
use tracing::debug;

pub struct SqliteCache {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteCache {
    pub fn open(path: &Path) -> Result<Self, MarketLensError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| cache_error(e))?;
        let cache = Self { pool };
        cache.initialize_schema()?;
        debug!(path = %path.display(), "sqlite cache opened");
        Ok(cache)
    }

    pub fn in_memory() -> Result<Self, MarketLensError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| cache_error(e))?;
        let cache = Self { pool };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, MarketLensError> {
        self.pool.get().map_err(|e: r2d2::Error| cache_error(e))
    }

    fn initialize_schema(&self) -> Result<(), MarketLensError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS analysis_cache (
                    ticker TEXT PRIMARY KEY,
                    payload TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );",
            )
            .map_err(|e: rusqlite::Error| cache_error(e))
    }
}

impl CachePort for SqliteCache {
    fn get(&self, ticker: &str) -> Result<Option<AnalysisBundle>, MarketLensError> {
        let payload: Option<String> = self
            .conn()?
            .query_row(
                "SELECT payload FROM analysis_cache WHERE ticker = ?1",
                params![ticker],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e: rusqlite::Error| cache_error(e))?;

        payload
            .map(|p| {
                serde_json::from_str(&p).map_err(|e| MarketLensError::CacheCorrupt {
                    path: format!("analysis_cache[{ticker}]"),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    fn put(&mut self, bundle: &AnalysisBundle) -> Result<(), MarketLensError> {
        let payload = serde_json::to_string(bundle)?;
        self.conn()?
            .execute(
                "INSERT OR REPLACE INTO analysis_cache (ticker, payload, updated_at)
                 VALUES (?1, ?2, ?3)",
                params![bundle.ticker, payload, bundle.generated_at.to_rfc3339()],
            )
            .map_err(|e: rusqlite::Error| cache_error(e))?;
        Ok(())
    }

    fn remove(&mut self, ticker: &str) -> Result<bool, MarketLensError> {
        let removed = self
            .conn()?
            .execute("DELETE FROM analysis_cache WHERE ticker = ?1", params![ticker])
            .map_err(|e: rusqlite::Error| cache_error(e))?;
        Ok(removed > 0)
    }

    fn clear(&mut self) -> Result<(), MarketLensError> {
        self.conn()?
            .execute("DELETE FROM analysis_cache", [])
            .map_err(|e: rusqlite::Error| cache_error(e))?;
        Ok(())
    }

    fn tickers(&self) -> Result<Vec<String>, MarketLensError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT ticker FROM analysis_cache ORDER BY ticker")
            .map_err(|e: rusqlite::Error| cache_error(e))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e: rusqlite::Error| cache_error(e))?;
        let tickers = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e: rusqlite::Error| cache_error(e))?;
        Ok(tickers)
    }
}

fn cache_error(e: impl std::fmt::Display) -> MarketLensError {
    MarketLensError::Cache {
        reason: e.to_string(),
    }
}
