//! Multi-symbol time alignment.
//!
//! Given daily bars for multiple symbols, align them to a common timeline.
//! A symbol with no bar on a date gets a void bar (all OHLC NaN); the fill
//! policy decides later whether such gaps are tolerable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::Field;

/// One day's OHLC record for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl DailyBar {
    pub fn value(&self, field: Field) -> f64 {
        match field {
            Field::Open => self.open,
            Field::High => self.high,
            Field::Low => self.low,
            Field::Close => self.close,
        }
    }

    /// True if any OHLC field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    fn void(date: NaiveDate) -> Self {
        Self {
            date,
            open: f64::NAN,
            high: f64::NAN,
            low: f64::NAN,
            close: f64::NAN,
            volume: 0.0,
        }
    }
}

/// Bar data for multiple symbols on a common timeline.
#[derive(Debug, Clone, Default)]
pub struct AlignedData {
    /// The common date axis (sorted ascending).
    pub dates: Vec<NaiveDate>,
    /// Bars per symbol; each inner Vec has the same length as `dates`.
    pub bars: BTreeMap<String, Vec<DailyBar>>,
}

impl AlignedData {
    /// Symbols in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.bars.keys().map(|s| s.as_str())
    }

    /// Index of the last date on or before `date`.
    pub fn index_at_or_before(&self, date: NaiveDate) -> Option<usize> {
        match self.dates.binary_search(&date) {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) => Some(i - 1),
        }
    }
}

/// Align multiple symbols to a common timeline.
///
/// The timeline is the union of all dates. Duplicate dates within a symbol
/// keep the last bar seen.
pub fn align_symbols(symbol_bars: HashMap<String, Vec<DailyBar>>) -> AlignedData {
    let dates: Vec<NaiveDate> = symbol_bars
        .values()
        .flat_map(|bars| bars.iter().map(|b| b.date))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut aligned = BTreeMap::new();
    for (symbol, bars) in symbol_bars {
        let by_date: HashMap<NaiveDate, DailyBar> =
            bars.into_iter().map(|b| (b.date, b)).collect();
        let series = dates
            .iter()
            .map(|date| {
                by_date
                    .get(date)
                    .cloned()
                    .unwrap_or_else(|| DailyBar::void(*date))
            })
            .collect();
        aligned.insert(symbol, series);
    }

    AlignedData {
        dates,
        bars: aligned,
    }
}
