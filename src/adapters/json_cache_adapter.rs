//! Single-file JSON analysis cache.
//!
//! The whole map is loaded on open and rewritten on every mutation. Writes go
//! to a temporary file in the same directory that then replaces the cache, so
//! a crash mid-write leaves the previous contents intact. There is no locking;
//! concurrent processes sharing a file may lose writes.

use crate::domain::analysis::AnalysisBundle;
use crate::domain::error::MarketLensError;
use crate::ports::cache_port::CachePort;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub struct JsonFileCache {
    path: PathBuf,
    entries: BTreeMap<String, AnalysisBundle>,
}

impl JsonFileCache {
    /// Loads `path`, or starts empty when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MarketLensError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| MarketLensError::CacheCorrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "json cache opened");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), MarketLensError> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), entries = self.entries.len(), "json cache flushed");
        Ok(())
    }
}

impl CachePort for JsonFileCache {
    fn get(&self, ticker: &str) -> Result<Option<AnalysisBundle>, MarketLensError> {
        Ok(self.entries.get(ticker).cloned())
    }

    fn put(&mut self, bundle: &AnalysisBundle) -> Result<(), MarketLensError> {
        self.entries.insert(bundle.ticker.clone(), bundle.clone());
        self.flush()
    }

    fn remove(&mut self, ticker: &str) -> Result<bool, MarketLensError> {
        if self.entries.remove(ticker).is_none() {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    fn clear(&mut self) -> Result<(), MarketLensError> {
        self.entries.clear();
        self.flush()
    }

    fn tickers(&self) -> Result<Vec<String>, MarketLensError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorSnapshot;
    use crate::domain::quote::FinancialSnapshot;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn bundle(ticker: &str, rsi: f64) -> AnalysisBundle {
        AnalysisBundle {
            ticker: ticker.to_string(),
            snapshot: FinancialSnapshot::new(ticker),
            indicators: IndicatorSnapshot {
                rsi: Some(rsi),
                ..IndicatorSnapshot::default()
            },
            sentiment: Vec::new(),
            news_error: None,
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let cache = JsonFileCache::open(dir.path().join("cache.json")).unwrap();
        assert!(cache.tickers().unwrap().is_empty());
        assert!(!cache.path().exists());
    }

    #[test]
    fn put_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = JsonFileCache::open(&path).unwrap();
        cache.put(&bundle("TCS.NS", 61.0)).unwrap();
        drop(cache);

        let reopened = JsonFileCache::open(&path).unwrap();
        assert_eq!(reopened.get("TCS.NS").unwrap(), Some(bundle("TCS.NS", 61.0)));
    }

    #[test]
    fn last_write_wins() {
        let dir = TempDir::new().unwrap();
        let mut cache = JsonFileCache::open(dir.path().join("c.json")).unwrap();
        cache.put(&bundle("INFY.NS", 40.0)).unwrap();
        cache.put(&bundle("INFY.NS", 70.0)).unwrap();
        assert_eq!(cache.get("INFY.NS").unwrap().unwrap().indicators.rsi, Some(70.0));
        assert_eq!(cache.tickers().unwrap(), vec!["INFY.NS"]);
    }

    #[test]
    fn remove_and_clear_flush() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.json");
        let mut cache = JsonFileCache::open(&path).unwrap();
        cache.put(&bundle("A", 1.0)).unwrap();
        cache.put(&bundle("B", 2.0)).unwrap();

        assert!(cache.remove("A").unwrap());
        assert!(!cache.remove("A").unwrap());
        assert_eq!(JsonFileCache::open(&path).unwrap().tickers().unwrap(), vec!["B"]);

        cache.clear().unwrap();
        assert!(JsonFileCache::open(&path).unwrap().tickers().unwrap().is_empty());
    }

    #[test]
    fn tickers_are_sorted() {
        let dir = TempDir::new().unwrap();
        let mut cache = JsonFileCache::open(dir.path().join("c.json")).unwrap();
        for t in ["WIPRO.NS", "ITC.NS", "SBIN.NS"] {
            cache.put(&bundle(t, 50.0)).unwrap();
        }
        assert_eq!(cache.tickers().unwrap(), vec!["ITC.NS", "SBIN.NS", "WIPRO.NS"]);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.json");
        fs::write(&path, "{not json").unwrap();

        let err = JsonFileCache::open(&path).err().unwrap();
        assert!(matches!(err, MarketLensError::CacheCorrupt { .. }));
    }

    #[test]
    fn blank_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.json");
        fs::write(&path, "\n").unwrap();
        assert!(JsonFileCache::open(&path).unwrap().tickers().unwrap().is_empty());
    }

    #[test]
    fn flush_leaves_only_the_cache_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.json");
        fs::write(&path, "{}").unwrap();

        let mut cache = JsonFileCache::open(&path).unwrap();
        cache.put(&bundle("A", 1.0)).unwrap();
        cache.put(&bundle("B", 2.0)).unwrap();
        cache.remove("A").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["c.json"]);
        assert_eq!(JsonFileCache::open(&path).unwrap().tickers().unwrap(), vec!["B"]);
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/c.json");
        let mut cache = JsonFileCache::open(&path).unwrap();
        cache.put(&bundle("X", 3.0)).unwrap();
        assert!(path.exists());
    }
}
