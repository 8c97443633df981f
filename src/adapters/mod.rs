//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod http;
pub mod json_cache_adapter;
pub mod mfapi_adapter;
pub mod newsapi_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_cache_adapter;
pub mod yahoo_adapter;
