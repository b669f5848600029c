//! Fill policy: missing-value tolerance and directional gap filling.
//!
//! A window is pulled field by field from the bar source. Each field's
//! missing fraction is `NaN count / window_length`, where a series shorter
//! than the window counts its shortfall as missing. If any field exceeds the
//! limit the whole window is rejected; otherwise gaps are filled in place.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::provider::{BarSource, DataError};
use crate::domain::{BarWindow, Field, Frequency, Instrument};

/// Direction used to carry valid values into gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMethod {
    /// Carry the last valid value forward; leading gaps stay NaN.
    #[serde(alias = "ffill", alias = "pad")]
    Forward,
    /// Carry the next valid value backward; trailing gaps stay NaN.
    #[default]
    #[serde(alias = "bfill")]
    Backward,
    /// Leave gaps as NaN.
    None,
}

/// Tolerance and fill method applied to every window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillPolicy {
    pub method: FillMethod,
    /// Maximum accepted missing fraction per field, in `[0, 1]`.
    pub limit: f64,
}

impl Default for FillPolicy {
    fn default() -> Self {
        Self {
            method: FillMethod::Backward,
            limit: 0.34,
        }
    }
}

impl FillPolicy {
    pub fn new(method: FillMethod, limit: f64) -> Self {
        Self { method, limit }
    }

    /// A field is rejected only when strictly above the limit.
    pub fn rejects(&self, missing_fraction: f64) -> bool {
        missing_fraction > self.limit
    }
}

/// Fraction of `window_length` slots that are NaN or absent.
pub fn missing_fraction(values: &[f64], window_length: usize) -> f64 {
    if window_length == 0 {
        return 0.0;
    }
    let present = values.len().min(window_length);
    let nan = values[values.len() - present..]
        .iter()
        .filter(|v| v.is_nan())
        .count();
    let missing = nan + (window_length - present);
    missing as f64 / window_length as f64
}

/// Fill NaN gaps in place using `method`.
pub fn fill_gaps(values: &mut [f64], method: FillMethod) {
    match method {
        FillMethod::Forward => {
            let mut carry = f64::NAN;
            for v in values.iter_mut() {
                if v.is_nan() {
                    *v = carry;
                } else {
                    carry = *v;
                }
            }
        }
        FillMethod::Backward => {
            let mut carry = f64::NAN;
            for v in values.iter_mut().rev() {
                if v.is_nan() {
                    *v = carry;
                } else {
                    carry = *v;
                }
            }
        }
        FillMethod::None => {}
    }
}

/// Left-pad with NaN or keep the most recent `window_length` values.
fn fit_to_window(mut values: Vec<f64>, window_length: usize) -> Vec<f64> {
    if values.len() >= window_length {
        values.split_off(values.len() - window_length)
    } else {
        let mut padded = vec![f64::NAN; window_length - values.len()];
        padded.extend(values);
        padded
    }
}

/// Pull, validate, and gap-fill a window of `fields` for one instrument.
///
/// Returns `Ok(None)` when any field's missing fraction exceeds the policy
/// limit; the caller skips the instrument for this step. Bar source failures
/// propagate.
pub fn prepare_window(
    source: &dyn BarSource,
    instrument: &Instrument,
    window_length: usize,
    frequency: Frequency,
    fields: &[Field],
    policy: &FillPolicy,
) -> Result<Option<BarWindow>, DataError> {
    let mut pulled = Vec::with_capacity(fields.len());
    for &field in fields {
        let values = source.history(instrument, field, window_length, frequency)?;
        pulled.push((field, fit_to_window(values, window_length)));
    }

    for (field, values) in &pulled {
        let fraction = missing_fraction(values, window_length);
        if policy.rejects(fraction) {
            warn!(
                symbol = %instrument,
                field = %field,
                missing = fraction,
                limit = policy.limit,
                "window rejected by fill policy"
            );
            return Ok(None);
        }
    }

    for (_, values) in pulled.iter_mut() {
        fill_gaps(values, policy.method);
    }

    let window = BarWindow::from_series(pulled)
        .map_err(|e| DataError::Other(format!("window for {instrument}: {e}")))?;
    Ok(Some(window))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<f64>);

    impl BarSource for Fixed {
        fn history(
            &self,
            _instrument: &Instrument,
            _field: Field,
            window_length: usize,
            _frequency: Frequency,
        ) -> Result<Vec<f64>, DataError> {
            let start = self.0.len().saturating_sub(window_length);
            Ok(self.0[start..].to_vec())
        }
    }

    fn inst() -> Instrument {
        Instrument::new(1, "TEST")
    }

    #[test]
    fn fraction_counts_nan_and_shortfall() {
        assert_eq!(missing_fraction(&[1.0, f64::NAN, 3.0, 4.0], 4), 0.25);
        assert_eq!(missing_fraction(&[1.0, 2.0], 4), 0.5);
        assert_eq!(missing_fraction(&[], 0), 0.0);
    }

    #[test]
    fn forward_fill_leaves_leading_gap() {
        let mut v = vec![f64::NAN, 1.0, f64::NAN, f64::NAN, 4.0];
        fill_gaps(&mut v, FillMethod::Forward);
        assert!(v[0].is_nan());
        assert_eq!(&v[1..], &[1.0, 1.0, 1.0, 4.0]);
    }

    #[test]
    fn backward_fill_leaves_trailing_gap() {
        let mut v = vec![f64::NAN, 1.0, f64::NAN, 4.0, f64::NAN];
        fill_gaps(&mut v, FillMethod::Backward);
        assert_eq!(&v[..4], &[1.0, 1.0, 4.0, 4.0]);
        assert!(v[4].is_nan());
    }

    #[test]
    fn no_fill_keeps_gaps() {
        let mut v = vec![1.0, f64::NAN, 3.0];
        fill_gaps(&mut v, FillMethod::None);
        assert!(v[1].is_nan());
    }

    #[test]
    fn fraction_equal_to_limit_is_accepted() {
        // 1 of 4 missing = 0.25 == limit
        let source = Fixed(vec![1.0, f64::NAN, 3.0, 4.0]);
        let policy = FillPolicy::new(FillMethod::Backward, 0.25);
        let window = prepare_window(&source, &inst(), 4, Frequency::Daily, &[Field::Close], &policy)
            .unwrap()
            .expect("window at the limit must be accepted");
        assert_eq!(window.get(Field::Close).unwrap(), &[1.0, 3.0, 3.0, 4.0]);
    }

    #[test]
    fn fraction_above_limit_is_rejected() {
        let source = Fixed(vec![1.0, f64::NAN, f64::NAN, 4.0]);
        let policy = FillPolicy::new(FillMethod::Forward, 0.25);
        let window =
            prepare_window(&source, &inst(), 4, Frequency::Daily, &[Field::Close], &policy).unwrap();
        assert!(window.is_none());
    }

    #[test]
    fn short_history_is_padded_and_counted() {
        let source = Fixed(vec![5.0, 6.0, 7.0]);
        let policy = FillPolicy::new(FillMethod::Backward, 0.5);
        let window = prepare_window(&source, &inst(), 4, Frequency::Daily, &[Field::High], &policy)
            .unwrap()
            .unwrap();
        assert_eq!(window.len(), 4);
        assert_eq!(window.get(Field::High).unwrap(), &[5.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn fill_method_aliases() {
        #[derive(Deserialize)]
        struct Wrap {
            m: FillMethod,
        }
        let w: Wrap = toml::from_str("m = \"bfill\"").unwrap();
        assert_eq!(w.m, FillMethod::Backward);
        let w: Wrap = toml::from_str("m = \"ffill\"").unwrap();
        assert_eq!(w.m, FillMethod::Forward);
        let w: Wrap = toml::from_str("m = \"none\"").unwrap();
        assert_eq!(w.m, FillMethod::None);
    }
}
