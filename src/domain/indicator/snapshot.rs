//! Latest-value view over the indicator series, as stored in an analysis bundle.

use crate::domain::indicator::{
    IndicatorValue, bollinger, calculate_bollinger, calculate_macd, calculate_rsi, macd, rsi,
};
use crate::domain::ohlcv::OhlcvBar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_mult_x100: u32,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: rsi::DEFAULT_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            bollinger_period: bollinger::DEFAULT_PERIOD,
            bollinger_mult_x100: bollinger::DEFAULT_STDDEV_MULT_X100,
        }
    }
}

impl IndicatorParams {
    /// Bars needed before every indicator has a valid reading.
    pub fn min_bars(&self) -> usize {
        let rsi = self.rsi_period + 1;
        let macd = self.macd_fast.max(self.macd_slow) + self.macd_signal - 1;
        rsi.max(macd).max(self.bollinger_period)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerReading {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<MacdReading>,
    pub bollinger: Option<BollingerReading>,
}

impl IndicatorSnapshot {
    /// Reads the last valid point of each series. Indicators whose warmup is
    /// longer than the history, or whose reading is not finite, stay `None`.
    pub fn compute(bars: &[OhlcvBar], params: &IndicatorParams) -> Self {
        let rsi = calculate_rsi(bars, params.rsi_period)
            .last_valid()
            .and_then(|p| match p.value {
                IndicatorValue::Simple(v) if v.is_finite() => Some(v),
                _ => None,
            });

        let macd = calculate_macd(bars, params.macd_fast, params.macd_slow, params.macd_signal)
            .last_valid()
            .and_then(|p| match p.value {
                IndicatorValue::Macd {
                    line,
                    signal,
                    histogram,
                } if [line, signal, histogram].iter().all(|v| v.is_finite()) => {
                    Some(MacdReading {
                        line,
                        signal,
                        histogram,
                    })
                }
                _ => None,
            });

        let bollinger =
            calculate_bollinger(bars, params.bollinger_period, params.bollinger_mult_x100)
                .last_valid()
                .and_then(|p| match p.value {
                    IndicatorValue::Bollinger {
                        upper,
                        middle,
                        lower,
                    } if [upper, middle, lower].iter().all(|v| v.is_finite()) => {
                        Some(BollingerReading {
                            upper,
                            middle,
                            lower,
                        })
                    }
                    _ => None,
                });

        Self {
            rsi,
            macd,
            bollinger,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.rsi.is_some() && self.macd.is_some() && self.bollinger.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::ema::tests::make_bars;

    #[test]
    fn min_bars_for_defaults() {
        // MACD dominates: 26 + 9 - 1
        assert_eq!(IndicatorParams::default().min_bars(), 34);
    }

    #[test]
    fn compute_with_enough_history_is_complete() {
        let prices: Vec<f64> = (0..34).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let snapshot = IndicatorSnapshot::compute(&make_bars(&prices), &IndicatorParams::default());
        assert!(snapshot.is_complete(), "{snapshot:?}");
    }

    #[test]
    fn compute_with_short_history_leaves_macd_empty() {
        let prices: Vec<f64> = (0..22).map(|i| 100.0 + i as f64).collect();
        let snapshot = IndicatorSnapshot::compute(&make_bars(&prices), &IndicatorParams::default());

        assert!(snapshot.rsi.is_some());
        assert!(snapshot.bollinger.is_some());
        assert!(snapshot.macd.is_none());
        assert!(!snapshot.is_complete());
    }

    #[test]
    fn compute_on_rising_series() {
        let prices: Vec<f64> = (0..60).map(|i| 10.0 + i as f64).collect();
        let snapshot = IndicatorSnapshot::compute(&make_bars(&prices), &IndicatorParams::default());

        assert_eq!(snapshot.rsi, Some(100.0));
        assert!(snapshot.macd.unwrap().line > 0.0);
        let boll = snapshot.bollinger.unwrap();
        approx::assert_relative_eq!(
            boll.upper - boll.middle,
            boll.middle - boll.lower,
            epsilon = 1e-9
        );
    }

    #[test]
    fn nan_close_in_window_drops_affected_readings() {
        let mut prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
        prices[45] = f64::NAN;
        let snapshot = IndicatorSnapshot::compute(&make_bars(&prices), &IndicatorParams::default());

        assert!(snapshot.macd.is_none());
        assert!(snapshot.bollinger.is_none());
        assert!(snapshot.rsi.is_none_or(f64::is_finite));
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: IndicatorSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn empty_history_yields_empty_snapshot() {
        let snapshot = IndicatorSnapshot::compute(&[], &IndicatorParams::default());
        assert_eq!(snapshot, IndicatorSnapshot::default());
    }

    #[test]
    fn serde_round_trip_keeps_missing_values_null() {
        let snapshot = IndicatorSnapshot {
            rsi: Some(42.0),
            macd: None,
            bollinger: None,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["macd"].is_null());
        let back: IndicatorSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
