//! Replay market: serves aligned daily bars up to a movable cursor.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use stockbot_core::data::{AlignedData, BarSource, DataError, SymbolResolver};
use stockbot_core::domain::{Field, Frequency, Instrument};

/// Bar source and symbol resolver over pre-loaded data.
///
/// Nothing after the cursor is ever visible. Sids are assigned in
/// alphabetical symbol order starting at 1.
#[derive(Debug, Clone)]
pub struct ReplayMarket {
    data: AlignedData,
    instruments: BTreeMap<String, Instrument>,
    cursor: Option<usize>,
}

impl ReplayMarket {
    pub fn new(data: AlignedData) -> Self {
        let instruments = data
            .symbols()
            .enumerate()
            .map(|(i, symbol)| (symbol.to_string(), Instrument::new(i as u32 + 1, symbol)))
            .collect();
        Self {
            data,
            instruments,
            cursor: None,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.data.dates
    }

    pub fn instruments(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.values()
    }

    /// Move the cursor to date index `index` (clamped to the last date).
    pub fn seek(&mut self, index: usize) {
        if !self.data.dates.is_empty() {
            self.cursor = Some(index.min(self.data.dates.len() - 1));
        }
    }

    /// Index of the last date on or before `date`.
    pub fn index_at_or_before(&self, date: NaiveDate) -> Option<usize> {
        self.data.index_at_or_before(date)
    }

    pub fn current_date(&self) -> Option<NaiveDate> {
        self.cursor.map(|i| self.data.dates[i])
    }

    /// Most recent defined close at or before the cursor.
    pub fn last_close(&self, instrument: &Instrument) -> Option<f64> {
        let cursor = self.cursor?;
        let bars = self.data.bars.get(&instrument.symbol)?;
        bars[..=cursor]
            .iter()
            .rev()
            .map(|b| b.close)
            .find(|c| !c.is_nan())
    }
}

impl BarSource for ReplayMarket {
    fn history(
        &self,
        instrument: &Instrument,
        field: Field,
        window_length: usize,
        frequency: Frequency,
    ) -> Result<Vec<f64>, DataError> {
        if frequency != Frequency::Daily {
            return Err(DataError::UnsupportedFrequency { frequency });
        }
        let bars = self
            .data
            .bars
            .get(&instrument.symbol)
            .ok_or_else(|| DataError::UnknownInstrument {
                symbol: instrument.symbol.clone(),
            })?;
        let Some(cursor) = self.cursor else {
            return Ok(Vec::new());
        };

        let end = cursor + 1;
        let start = end.saturating_sub(window_length);
        Ok(bars[start..end].iter().map(|b| b.value(field)).collect())
    }
}

impl SymbolResolver for ReplayMarket {
    fn resolve_symbol(&self, symbol: &str) -> Option<Instrument> {
        self.instruments.get(symbol).cloned()
    }
}
