//! marketlens: market quotes, technical indicators, headline sentiment and
//! mutual fund NAVs from public data APIs, with a local analysis cache.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], command-line entry in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
