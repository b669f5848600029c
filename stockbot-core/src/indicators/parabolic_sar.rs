//! Parabolic SAR: Wilder's acceleration factor system.
//!
//! Inherently sequential/stateful: maintains direction, extreme point (EP),
//! and acceleration factor (AF). Uses high and low only. The acceleration
//! factor starts at `accel`, grows by `accel` on each new extreme, and is
//! capped at `accel_max`.
//!
//! The initial trend is short when the first bar-to-bar downward movement
//! exceeds the upward movement, long otherwise. Leading NaN bars are skipped:
//! the series starts at the first pair of consecutive valid bars. Lookback: 1.

use super::{require, require_valid, Indicator, IndicatorError};
use crate::domain::{BarWindow, Field};

#[derive(Debug, Clone)]
pub struct ParabolicSar {
    accel: f64,
    accel_max: f64,
    name: String,
}

impl ParabolicSar {
    pub fn new(accel: f64, accel_max: f64) -> Self {
        Self {
            accel,
            accel_max,
            name: format!("sar_{accel}_{accel_max}"),
        }
    }

    /// Default parameters: 0.02, 0.20
    pub fn default_params() -> Self {
        Self::new(0.02, 0.20)
    }

    fn sar(&self, high: &[f64], low: &[f64]) -> Vec<f64> {
        let n = high.len();
        let mut result = vec![f64::NAN; n];

        // seed on the first two consecutive valid bars
        let valid = |i: usize| !high[i].is_nan() && !low[i].is_nan();
        let Some(b) = (0..n.saturating_sub(1)).find(|&i| valid(i) && valid(i + 1)) else {
            return result;
        };

        let up_move = high[b + 1] - high[b];
        let down_move = low[b] - low[b + 1];
        let mut is_long = !(down_move > 0.0 && down_move > up_move);
        let mut af = self.accel;
        let (mut sar, mut ep) = if is_long {
            (low[b], high[b + 1])
        } else {
            (high[b], low[b + 1])
        };

        result[b + 1] = sar;

        for i in b + 2..n {
            if !valid(i) {
                continue;
            }

            let mut next = sar + af * (ep - sar);

            if is_long {
                // SAR may not rise above the two previous lows
                for prev in [low[i - 1], low[i - 2]] {
                    if !prev.is_nan() {
                        next = next.min(prev);
                    }
                }
                if low[i] < next {
                    is_long = false;
                    next = ep;
                    ep = low[i];
                    af = self.accel;
                } else if high[i] > ep {
                    ep = high[i];
                    af = (af + self.accel).min(self.accel_max);
                }
            } else {
                // SAR may not fall below the two previous highs
                for prev in [high[i - 1], high[i - 2]] {
                    if !prev.is_nan() {
                        next = next.max(prev);
                    }
                }
                if high[i] > next {
                    is_long = true;
                    next = ep;
                    ep = high[i];
                    af = self.accel;
                } else if low[i] < ep {
                    ep = low[i];
                    af = (af + self.accel).min(self.accel_max);
                }
            }

            sar = next;
            result[i] = sar;
        }

        result
    }
}

impl Indicator for ParabolicSar {
    type Output = Vec<f64>;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, window: &BarWindow) -> Result<Vec<f64>, IndicatorError> {
        if self.accel.is_nan() || self.accel <= 0.0 || self.accel_max < self.accel {
            return Err(IndicatorError::invalid(
                &self.name,
                "accel must be > 0 and accel_max >= accel",
            ));
        }
        let high = require(window, Field::High, &self.name)?;
        let low = require(window, Field::Low, &self.name)?;
        require_valid(&self.name, &[high, low])?;

        Ok(self.sar(high, low))
    }
}
