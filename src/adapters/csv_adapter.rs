//! Offline market data from CSV files, plus CSV export of bars.
//!
//! Each symbol lives in `<dir>/<SYMBOL>.csv` with the header
//! `date,open,high,low,close,volume` and ISO dates.

use crate::domain::error::MarketLensError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::quote::FinancialSnapshot;
use crate::domain::symbol;
use crate::ports::market_data_port::MarketDataPort;
use chrono::{Datelike, Duration, Months, NaiveDate};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct CsvHistoryAdapter {
    base_path: PathBuf,
}

impl CsvHistoryAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }

    fn load_all(&self, symbol: &str) -> Result<Vec<OhlcvBar>, MarketLensError> {
        let path = self.csv_path(symbol);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MarketLensError::no_data(symbol));
            }
            Err(e) => return Err(e.into()),
        };

        let mut rdr = csv::Reader::from_reader(file);
        let mut bars = Vec::new();
        for row in rdr.deserialize::<OhlcvBar>() {
            let bar = row?;
            if bar.has_finite_prices() {
                bars.push(bar);
            } else {
                warn!(symbol, date = %bar.date, "skipping bar with non-finite price");
            }
        }
        bars.sort_by_key(|b| b.date);
        debug!(symbol, path = %path.display(), bars = bars.len(), "csv loaded");

        if bars.is_empty() {
            return Err(MarketLensError::no_data(symbol));
        }
        Ok(bars)
    }
}

impl MarketDataPort for CsvHistoryAdapter {
    /// Builds a snapshot from the last two bars and the trailing year.
    fn fetch_quote(&self, symbol: &str) -> Result<FinancialSnapshot, MarketLensError> {
        info!(symbol, "reading quote from csv");
        let bars = self.load_all(symbol)?;
        let Some(last) = bars.last() else {
            return Err(MarketLensError::no_data(symbol));
        };
        let previous = bars.len().checked_sub(2).map(|i| &bars[i]);

        let year_start = last.date - Duration::days(365);
        let year: Vec<&OhlcvBar> = bars.iter().filter(|b| b.date > year_start).collect();
        let high = year.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = year.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

        Ok(FinancialSnapshot {
            name: symbol::company_name(symbol).map(str::to_string),
            current_price: Some(last.close),
            previous_close: previous.map(|b| b.close),
            day_high: Some(last.high),
            day_low: Some(last.low),
            volume: Some(last.volume),
            fifty_two_week_high: Some(high),
            fifty_two_week_low: Some(low),
            ..FinancialSnapshot::new(symbol)
        }
        .with_derived_change())
    }

    /// Bars within `range` of the newest bar. Files hold daily bars, so
    /// `interval` is not applied.
    fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<OhlcvBar>, MarketLensError> {
        info!(symbol, range, "reading history from csv");
        if interval != "1d" {
            debug!(interval, "csv history is daily; interval ignored");
        }

        let bars = self.load_all(symbol)?;
        let Some(last) = bars.last().map(|b| b.date) else {
            return Err(MarketLensError::no_data(symbol));
        };
        let cutoff = range_start(last, range);
        Ok(bars
            .into_iter()
            .filter(|b| cutoff.is_none_or(|c| b.date > c))
            .collect())
    }
}

/// Exclusive lower bound for `range` ending at `end`. `None` means no bound.
fn range_start(end: NaiveDate, range: &str) -> Option<NaiveDate> {
    let months = |n: u32| end.checked_sub_months(Months::new(n));
    match range {
        "1d" => Some(end - Duration::days(1)),
        "5d" => Some(end - Duration::days(5)),
        "1mo" => months(1),
        "3mo" => months(3),
        "6mo" => months(6),
        "1y" => months(12),
        "2y" => months(24),
        "5y" => months(60),
        "10y" => months(120),
        "ytd" => NaiveDate::from_ymd_opt(end.year(), 1, 1).and_then(|d| d.pred_opt()),
        _ => None,
    }
}

/// Writes bars as CSV with the same header the adapter reads.
pub fn write_history_csv<W: Write>(writer: W, bars: &[OhlcvBar]) -> Result<(), MarketLensError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for bar in bars {
        wtr.serialize(bar)?;
    }
    wtr.flush()?;
    Ok(())
}
