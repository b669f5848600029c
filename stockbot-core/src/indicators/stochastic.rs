//! Stochastic oscillator (slow %K / %D).
//!
//! fast %K = 100 * (close - lowest low) / (highest high - lowest low) over
//! `fastk_period` bars; slow %K is a 3-bar SMA of fast %K and %D a 3-bar SMA
//! of slow %K. A flat range (highest == lowest) gives fast %K = 0.
//!
//! Lookback: fastk_period + 3, so `fastk_period + 4` bars give one defined value.

use super::sma::sma;
use super::{require, require_valid, Indicator, IndicatorError};
use crate::domain::{BarWindow, Field};

const SLOWK_PERIOD: usize = 3;
const SLOWD_PERIOD: usize = 3;

/// Slow %K and %D series, aligned with the input window.
#[derive(Debug, Clone, PartialEq)]
pub struct StochSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    fastk_period: usize,
    name: String,
}

impl Stochastic {
    pub fn new(fastk_period: usize) -> Self {
        Self {
            fastk_period,
            name: format!("stoch_{fastk_period}"),
        }
    }
}

fn fast_k(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let n = close.len();
    let mut result = vec![f64::NAN; n];

    for i in period.saturating_sub(1)..n {
        let start = i + 1 - period;
        let (mut hh, mut ll) = (f64::NEG_INFINITY, f64::INFINITY);
        let mut valid = !close[i].is_nan();
        for j in start..=i {
            if high[j].is_nan() || low[j].is_nan() {
                valid = false;
                break;
            }
            hh = hh.max(high[j]);
            ll = ll.min(low[j]);
        }
        if !valid {
            continue;
        }
        let range = hh - ll;
        result[i] = if range == 0.0 {
            0.0
        } else {
            100.0 * (close[i] - ll) / range
        };
    }

    result
}

impl Indicator for Stochastic {
    type Output = StochSeries;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.fastk_period.saturating_sub(1) + (SLOWK_PERIOD - 1) + (SLOWD_PERIOD - 1)
    }

    fn compute(&self, window: &BarWindow) -> Result<StochSeries, IndicatorError> {
        if self.fastk_period == 0 {
            return Err(IndicatorError::invalid(&self.name, "fastk period must be >= 1"));
        }
        let high = require(window, Field::High, &self.name)?;
        let low = require(window, Field::Low, &self.name)?;
        let close = require(window, Field::Close, &self.name)?;
        require_valid(&self.name, &[high, low, close])?;

        let k = sma(&fast_k(high, low, close, self.fastk_period), SLOWK_PERIOD);
        let d = sma(&k, SLOWD_PERIOD);
        Ok(StochSeries { k, d })
    }
}
