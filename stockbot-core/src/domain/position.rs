use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::instrument::Instrument;
use super::order::Signal;

/// Current holding in one instrument, as reported by the order sink.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Signed share count: positive long, negative short.
    pub amount: f64,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_flat(&self) -> bool {
        self.amount == 0.0
    }
}

/// Position table keyed by instrument, iterated in instrument order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Positions {
    inner: BTreeMap<Instrument, Position>,
}

impl Positions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the held amount; a zero amount removes the entry.
    pub fn set(&mut self, instrument: Instrument, amount: f64) {
        if amount == 0.0 {
            self.inner.remove(&instrument);
        } else {
            self.inner.insert(instrument, Position { amount });
        }
    }

    pub fn get(&self, instrument: &Instrument) -> Option<&Position> {
        self.inner.get(instrument)
    }

    /// Signed amount held, zero when absent.
    pub fn amount(&self, instrument: &Instrument) -> f64 {
        self.get(instrument).map_or(0.0, |p| p.amount)
    }

    /// True if a new order with `signal` would change the held direction.
    ///
    /// Long needs a flat or short holding, short needs a flat or long one,
    /// and close needs something to close.
    pub fn needs_order(&self, instrument: &Instrument, signal: Signal) -> bool {
        let amount = self.amount(instrument);
        match signal {
            Signal::Long => amount <= 0.0,
            Signal::Short => amount >= 0.0,
            Signal::Close => amount != 0.0,
        }
    }

    /// Instruments with a non-zero holding.
    pub fn held(&self) -> impl Iterator<Item = (&Instrument, &Position)> {
        self.inner.iter().filter(|(_, p)| !p.is_flat())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromIterator<(Instrument, f64)> for Positions {
    fn from_iter<T: IntoIterator<Item = (Instrument, f64)>>(iter: T) -> Self {
        let mut positions = Positions::new();
        for (instrument, amount) in iter {
            positions.set(instrument, amount);
        }
        positions
    }
}
