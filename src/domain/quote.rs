//! Point-in-time financial snapshot of a listed security.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    pub symbol: String,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<i64>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
}

impl FinancialSnapshot {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Fills `change` and `change_percent` from price and previous close when
    /// the provider left them out.
    pub fn with_derived_change(mut self) -> Self {
        if let (Some(price), Some(prev)) = (self.current_price, self.previous_close) {
            if self.change.is_none() {
                self.change = Some(price - prev);
            }
            if self.change_percent.is_none() && prev != 0.0 {
                self.change_percent = Some((price - prev) / prev * 100.0);
            }
        }
        self
    }
}
