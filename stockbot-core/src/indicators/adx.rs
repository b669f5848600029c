//! Directional movement: +DI / -DI and ADX (Wilder).
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive bars
//! 2. Smooth +DM, -DM, and TR using Wilder smoothing (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = Wilder-smoothed DX
//!
//! +DI/-DI are first defined at index `period`; ADX at `2 * period - 1`.

use super::wilder::{true_range, wilder_smooth};
use super::{require, require_valid, Indicator, IndicatorError};
use crate::domain::{BarWindow, Field};

/// +DI and -DI series, aligned with the input window.
#[derive(Debug, Clone, PartialEq)]
pub struct DiSeries {
    pub plus: Vec<f64>,
    pub minus: Vec<f64>,
}

fn directional_index(high: &[f64], low: &[f64], close: &[f64], period: usize) -> DiSeries {
    let n = high.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        if high[i].is_nan() || low[i].is_nan() || high[i - 1].is_nan() || low[i - 1].is_nan() {
            continue;
        }
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    let tr = wilder_smooth(&true_range(high, low, close), period);
    let plus_dm = wilder_smooth(&plus_dm, period);
    let minus_dm = wilder_smooth(&minus_dm, period);

    let mut plus = vec![f64::NAN; n];
    let mut minus = vec![f64::NAN; n];
    for i in 0..n {
        if tr[i].is_nan() || plus_dm[i].is_nan() || minus_dm[i].is_nan() {
            continue;
        }
        if tr[i] == 0.0 {
            plus[i] = 0.0;
            minus[i] = 0.0;
        } else {
            plus[i] = 100.0 * plus_dm[i] / tr[i];
            minus[i] = 100.0 * minus_dm[i] / tr[i];
        }
    }

    DiSeries { plus, minus }
}

/// Plus/Minus Directional Indicator.
#[derive(Debug, Clone)]
pub struct DirectionalIndex {
    period: usize,
    name: String,
}

impl DirectionalIndex {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("di_{period}"),
        }
    }
}

impl Indicator for DirectionalIndex {
    type Output = DiSeries;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, window: &BarWindow) -> Result<DiSeries, IndicatorError> {
        if self.period == 0 {
            return Err(IndicatorError::invalid(&self.name, "period must be >= 1"));
        }
        let high = require(window, Field::High, &self.name)?;
        let low = require(window, Field::Low, &self.name)?;
        let close = require(window, Field::Close, &self.name)?;
        require_valid(&self.name, &[high, low, close])?;

        Ok(directional_index(high, low, close, self.period))
    }
}

/// Average Directional Index.
#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

impl Indicator for Adx {
    type Output = Vec<f64>;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        (2 * self.period).saturating_sub(1)
    }

    fn compute(&self, window: &BarWindow) -> Result<Vec<f64>, IndicatorError> {
        if self.period == 0 {
            return Err(IndicatorError::invalid(&self.name, "period must be >= 1"));
        }
        let high = require(window, Field::High, &self.name)?;
        let low = require(window, Field::Low, &self.name)?;
        let close = require(window, Field::Close, &self.name)?;
        require_valid(&self.name, &[high, low, close])?;

        let di = directional_index(high, low, close, self.period);
        let dx: Vec<f64> = di
            .plus
            .iter()
            .zip(&di.minus)
            .map(|(&p, &m)| {
                if p.is_nan() || m.is_nan() {
                    f64::NAN
                } else if p + m == 0.0 {
                    0.0
                } else {
                    100.0 * (p - m).abs() / (p + m)
                }
            })
            .collect();

        Ok(wilder_smooth(&dx, self.period))
    }
}
