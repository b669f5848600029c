//! Indicator evaluators.
//!
//! Pure functions from a validated `BarWindow` to one or more series of the
//! same length, NaN during warm-up. A window whose required inputs are all
//! NaN yields `IndicatorError::InsufficientData`, which callers treat as a
//! skip; every other error is a programming or configuration fault.

pub mod adx;
pub mod parabolic_sar;
pub mod sma;
pub mod stochastic;
pub mod wilder;

pub use adx::{Adx, DiSeries, DirectionalIndex};
pub use parabolic_sar::ParabolicSar;
pub use sma::sma;
pub use stochastic::{StochSeries, Stochastic};
pub use wilder::{true_range, wilder_smooth};

use thiserror::Error;

use crate::domain::{BarWindow, Field};

#[derive(Debug, Error, PartialEq)]
pub enum IndicatorError {
    #[error("{indicator}: inputs are all NaN")]
    InsufficientData { indicator: String },

    #[error("{indicator}: window has no {field} series")]
    MissingField { indicator: String, field: Field },

    #[error("{indicator}: {reason}")]
    InvalidParameter { indicator: String, reason: String },
}

impl IndicatorError {
    pub(crate) fn invalid(indicator: &str, reason: &str) -> Self {
        IndicatorError::InvalidParameter {
            indicator: indicator.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for the recoverable "no usable input" case.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, IndicatorError::InsufficientData { .. })
    }
}

/// Trait for indicator evaluators.
///
/// # Look-ahead contamination guard
/// No output value at index t may depend on input from index t+1 or later.
pub trait Indicator {
    type Output;

    /// Human-readable name (e.g., "adx_14", "stoch_14").
    fn name(&self) -> &str;

    /// Index of the first defined output value.
    fn lookback(&self) -> usize;

    fn compute(&self, window: &BarWindow) -> Result<Self::Output, IndicatorError>;
}

pub(crate) fn require<'a>(
    window: &'a BarWindow,
    field: Field,
    indicator: &str,
) -> Result<&'a [f64], IndicatorError> {
    window.get(field).ok_or_else(|| IndicatorError::MissingField {
        indicator: indicator.to_string(),
        field,
    })
}

/// Fails with `InsufficientData` if any input series has no valid value.
pub(crate) fn require_valid(indicator: &str, inputs: &[&[f64]]) -> Result<(), IndicatorError> {
    if inputs.iter().any(|s| s.iter().all(|v| v.is_nan())) {
        return Err(IndicatorError::InsufficientData {
            indicator: indicator.to_string(),
        });
    }
    Ok(())
}

/// Build a high/low/close window from tuples for testing.
#[cfg(test)]
pub fn hlc_window(data: &[(f64, f64, f64)]) -> BarWindow {
    BarWindow::from_series([
        (Field::High, data.iter().map(|d| d.0).collect()),
        (Field::Low, data.iter().map(|d| d.1).collect()),
        (Field::Close, data.iter().map(|d| d.2).collect()),
    ])
    .unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
