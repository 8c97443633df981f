//! Ticker symbol handling: normalization, known listings, and watchlists.

use std::collections::HashSet;

pub const DEFAULT_TICKER: &str = "RELIANCE.NS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub symbol: &'static str,
    pub name: &'static str,
}

/// Large-cap NSE listings used as the default watchlist.
pub const KNOWN_LISTINGS: &[Listing] = &[
    Listing {
        symbol: "RELIANCE.NS",
        name: "Reliance Industries Ltd",
    },
    Listing {
        symbol: "TCS.NS",
        name: "Tata Consultancy Services Ltd",
    },
    Listing {
        symbol: "HDFCBANK.NS",
        name: "HDFC Bank Ltd",
    },
    Listing {
        symbol: "INFY.NS",
        name: "Infosys Ltd",
    },
    Listing {
        symbol: "ICICIBANK.NS",
        name: "ICICI Bank Ltd",
    },
    Listing {
        symbol: "HINDUNILVR.NS",
        name: "Hindustan Unilever Ltd",
    },
    Listing {
        symbol: "SBIN.NS",
        name: "State Bank of India",
    },
    Listing {
        symbol: "BHARTIARTL.NS",
        name: "Bharti Airtel Ltd",
    },
    Listing {
        symbol: "ITC.NS",
        name: "ITC Ltd",
    },
    Listing {
        symbol: "KOTAKBANK.NS",
        name: "Kotak Mahindra Bank Ltd",
    },
    Listing {
        symbol: "WIPRO.NS",
        name: "Wipro Ltd",
    },
    Listing {
        symbol: "AXISBANK.NS",
        name: "Axis Bank Ltd",
    },
    Listing {
        symbol: "ASIANPAINT.NS",
        name: "Asian Paints Ltd",
    },
    Listing {
        symbol: "MARUTI.NS",
        name: "Maruti Suzuki India Ltd",
    },
    Listing {
        symbol: "SUNPHARMA.NS",
        name: "Sun Pharmaceutical Industries Ltd",
    },
];

/// Benchmark indices reported alongside the movers.
pub const MARKET_INDICES: &[Listing] = &[
    Listing {
        symbol: "^NSEI",
        name: "Nifty 50",
    },
    Listing {
        symbol: "^BSESN",
        name: "BSE Sensex",
    },
    Listing {
        symbol: "^NSEBANK",
        name: "Nifty Bank",
    },
    Listing {
        symbol: "^CNXIT",
        name: "Nifty IT",
    },
    Listing {
        symbol: "^CNXPHARMA",
        name: "Nifty Pharma",
    },
    Listing {
        symbol: "^DJI",
        name: "Dow Jones Industrial Average",
    },
    Listing {
        symbol: "^IXIC",
        name: "NASDAQ Composite",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolListError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    Duplicate(String),
}

/// Upper-cases and trims `raw`. A bare symbol that matches a known listing
/// gains that listing's exchange suffix; any other bare symbol gains
/// `default_suffix` when one is configured. Index symbols (`^NSEI`) and
/// symbols that already carry a suffix are left alone.
pub fn normalize_symbol(raw: &str, default_suffix: Option<&str>) -> String {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() || symbol.contains('.') || symbol.starts_with('^') {
        return symbol;
    }

    if let Some(listing) = KNOWN_LISTINGS
        .iter()
        .find(|l| l.symbol.split('.').next() == Some(symbol.as_str()))
    {
        return listing.symbol.to_string();
    }

    match default_suffix.map(str::trim).filter(|s| !s.is_empty()) {
        Some(suffix) => {
            let suffix = suffix.trim_start_matches('.').to_uppercase();
            format!("{symbol}.{suffix}")
        }
        None => symbol,
    }
}

/// Display name of a known listing or index.
pub fn company_name(symbol: &str) -> Option<&'static str> {
    KNOWN_LISTINGS
        .iter()
        .chain(MARKET_INDICES)
        .find(|l| l.symbol.eq_ignore_ascii_case(symbol))
        .map(|l| l.name)
}

pub fn default_watchlist() -> Vec<String> {
    KNOWN_LISTINGS.iter().map(|l| l.symbol.to_string()).collect()
}

pub fn default_indices() -> Vec<String> {
    MARKET_INDICES.iter().map(|l| l.symbol.to_string()).collect()
}

/// Parses a comma-separated watchlist, normalizing each entry.
pub fn parse_symbols(
    input: &str,
    default_suffix: Option<&str>,
) -> Result<Vec<String>, SymbolListError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(SymbolListError::EmptyToken);
        }
        let symbol = normalize_symbol(trimmed, default_suffix);
        if !seen.insert(symbol.clone()) {
            return Err(SymbolListError::Duplicate(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}
