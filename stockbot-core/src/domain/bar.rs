//! Bar fields, sampling frequency, and the aligned bar window.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A single OHLC column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Open,
    High,
    Low,
    Close,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bar sampling frequency requested from a bar source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Minute,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => f.write_str("1d"),
            Frequency::Minute => f.write_str("1m"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WindowError {
    #[error("field {field} has {actual} values, window length is {expected}")]
    LengthMismatch {
        field: Field,
        expected: usize,
        actual: usize,
    },
}

/// Named OHLC series pulled for the same window.
///
/// Every field shares the same length and implicit time index; the last
/// value of each series is the current bar. Missing values are NaN.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarWindow {
    len: usize,
    series: BTreeMap<Field, Vec<f64>>,
}

impl BarWindow {
    /// Build a window, rejecting series whose lengths disagree.
    pub fn from_series<I>(series: I) -> Result<Self, WindowError>
    where
        I: IntoIterator<Item = (Field, Vec<f64>)>,
    {
        let mut len = None;
        let mut map = BTreeMap::new();
        for (field, values) in series {
            let expected = *len.get_or_insert(values.len());
            if values.len() != expected {
                return Err(WindowError::LengthMismatch {
                    field,
                    expected,
                    actual: values.len(),
                });
            }
            map.insert(field, values);
        }
        Ok(Self {
            len: len.unwrap_or(0),
            series: map,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, field: Field) -> Option<&[f64]> {
        self.series.get(&field).map(|v| v.as_slice())
    }

    /// Value of `field` at the current (last) bar.
    pub fn last(&self, field: Field) -> Option<f64> {
        self.get(field).and_then(|v| v.last().copied())
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.series.keys().copied()
    }
}
