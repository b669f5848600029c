//! Trade signals and the order instructions strategies hand to the order sink.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::instrument::Instrument;

/// Direction a strategy wants to hold an instrument in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Long,
    Short,
    Close,
}

impl Signal {
    /// Map an indicator comparison onto a signal: greater is long,
    /// smaller is short, equal (or unordered) is close.
    pub fn from_comparison(lhs: f64, rhs: f64) -> Self {
        if lhs > rhs {
            Signal::Long
        } else if lhs < rhs {
            Signal::Short
        } else {
            Signal::Close
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Long => f.write_str("long"),
            Signal::Short => f.write_str("short"),
            Signal::Close => f.write_str("close"),
        }
    }
}

/// How an instruction's size is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OrderTarget {
    /// Signed fraction of portfolio value.
    Percent(f64),
    /// Signed share count.
    Shares(f64),
}

/// An order a strategy wants submitted this step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInstruction {
    pub instrument: Instrument,
    pub signal: Signal,
    pub target: OrderTarget,
}

impl OrderInstruction {
    pub fn percent(instrument: Instrument, signal: Signal, target: f64) -> Self {
        Self {
            instrument,
            signal,
            target: OrderTarget::Percent(target),
        }
    }
}
