use serde::{Deserialize, Serialize};
use std::fmt;

/// A tradable instrument, resolved once from a ticker string.
///
/// `sid` is the identifier assigned by the symbol resolver. Ordering and
/// equality go through `sid` first, so two instruments resolved from the same
/// ticker compare equal and sort in resolver order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Instrument {
    pub sid: u32,
    pub symbol: String,
}

impl Instrument {
    pub fn new(sid: u32, symbol: impl Into<String>) -> Self {
        Self {
            sid,
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}
