//! Ranking engine: orders a universe by indicator value.
//!
//! The ADX ranker pulls a fill-policy-validated high/low/close window of
//! `2 * di_window` bars per instrument, evaluates ADX, and sorts the defined
//! values descending. Ties keep universe order (stable sort). Instruments
//! whose window is rejected or whose ADX is undefined are left out.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::{prepare_window, BarSource, FillPolicy};
use crate::domain::{Field, Frequency, Instrument};
use crate::error::StrategyError;
use crate::indicators::{Adx, Indicator};

const HLC: [Field; 3] = [Field::High, Field::Low, Field::Close];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub instrument: Instrument,
    pub value: f64,
}

/// Instruments sorted descending by value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    entries: Vec<RankEntry>,
}

impl Ranking {
    /// Sort `(instrument, value)` pairs descending, dropping NaN values.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (Instrument, f64)>,
    {
        let mut entries: Vec<RankEntry> = values
            .into_iter()
            .filter(|(_, v)| !v.is_nan())
            .map(|(instrument, value)| RankEntry { instrument, value })
            .collect();
        entries.sort_by(|a, b| b.value.total_cmp(&a.value));
        Self { entries }
    }

    pub fn entries(&self) -> &[RankEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First `k` entries (fewer if the ranking is shorter).
    pub fn top(&self, k: usize) -> &[RankEntry] {
        &self.entries[..k.min(self.entries.len())]
    }

    /// Last `k` entries; empty when `k == 0`.
    pub fn bottom(&self, k: usize) -> &[RankEntry] {
        let n = self.entries.len();
        &self.entries[n - k.min(n)..]
    }

    /// Partition into top and bottom sets that never share an entry.
    ///
    /// When fewer than `top_rank + bot_rank` instruments ranked this step,
    /// the top set is filled first and the bottom set takes what remains.
    pub fn split(&self, top_rank: usize, bot_rank: usize) -> RankSets {
        let top = self.top(top_rank);
        let n = self.entries.len();
        let bot_start = n.saturating_sub(bot_rank).max(top.len());
        RankSets {
            top: top.to_vec(),
            bot: self.entries[bot_start..].to_vec(),
        }
    }
}

/// The trending (top) and oscillating (bottom) sets in effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankSets {
    pub top: Vec<RankEntry>,
    pub bot: Vec<RankEntry>,
}

impl RankSets {
    pub fn top_instruments(&self) -> Vec<Instrument> {
        self.top.iter().map(|e| e.instrument.clone()).collect()
    }

    pub fn bot_instruments(&self) -> Vec<Instrument> {
        self.bot.iter().map(|e| e.instrument.clone()).collect()
    }

    pub fn contains(&self, instrument: &Instrument) -> bool {
        self.top
            .iter()
            .chain(&self.bot)
            .any(|e| &e.instrument == instrument)
    }
}

/// A ranking function over an instrument universe.
pub trait Ranker {
    fn name(&self) -> &str;

    /// True once `step` bars of history are enough to rank.
    fn is_ready(&self, step: usize) -> bool;

    fn rank(
        &self,
        source: &dyn BarSource,
        universe: &[Instrument],
    ) -> Result<Ranking, StrategyError>;
}

/// Ranks by ADX over a `2 * di_window` bar window.
#[derive(Debug, Clone)]
pub struct AdxRanker {
    pub di_window: usize,
    pub frequency: Frequency,
    pub fill: FillPolicy,
}

impl AdxRanker {
    pub fn new(di_window: usize, frequency: Frequency, fill: FillPolicy) -> Self {
        Self {
            di_window,
            frequency,
            fill,
        }
    }

    fn window_length(&self) -> usize {
        2 * self.di_window
    }
}

impl Ranker for AdxRanker {
    fn name(&self) -> &str {
        "adx"
    }

    fn is_ready(&self, step: usize) -> bool {
        step >= self.window_length()
    }

    fn rank(
        &self,
        source: &dyn BarSource,
        universe: &[Instrument],
    ) -> Result<Ranking, StrategyError> {
        let adx = Adx::new(self.di_window);
        let mut values = Vec::with_capacity(universe.len());

        for instrument in universe {
            let Some(window) = prepare_window(
                source,
                instrument,
                self.window_length(),
                self.frequency,
                &HLC,
                &self.fill,
            )?
            else {
                continue;
            };

            match adx.compute(&window) {
                Ok(series) => match series.last() {
                    Some(&value) if !value.is_nan() => values.push((instrument.clone(), value)),
                    _ => warn!(symbol = %instrument, "adx is NaN, skipping"),
                },
                Err(e) if e.is_insufficient_data() => {
                    warn!(symbol = %instrument, error = %e, "NaN inputs, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Ranking::from_values(values))
    }
}

/// Rank `universe` by ADX and split into top and bottom sets.
///
/// Callers check `AdxRanker::is_ready` first; an unready source simply
/// produces undefined values and an empty ranking.
pub fn rank(
    source: &dyn BarSource,
    universe: &[Instrument],
    di_window: usize,
    top_rank: usize,
    bot_rank: usize,
    frequency: Frequency,
    fill: FillPolicy,
) -> Result<RankSets, StrategyError> {
    let ranking = AdxRanker::new(di_window, frequency, fill).rank(source, universe)?;
    Ok(ranking.split(top_rank, bot_rank))
}
