//! Bar source and symbol resolver traits, and structured data errors.
//!
//! Both traits are implemented by whatever drives the algorithm (a replay
//! harness, a live adapter, or a test fake). The core only reads through them.

use thiserror::Error;
use tracing::warn;

use crate::domain::{Field, Frequency, Instrument};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("unknown instrument: {symbol}")]
    UnknownInstrument { symbol: String },

    #[error("frequency {frequency} is not supported by this bar source")]
    UnsupportedFrequency { frequency: Frequency },

    #[error("data error: {0}")]
    Other(String),
}

/// Supplies recent bar values ending at the current simulated time.
pub trait BarSource {
    /// Up to `window_length` most recent values of `field`, oldest first.
    ///
    /// The last element is the current bar. Missing bars are NaN. When less
    /// history exists than requested, the returned series is shorter.
    fn history(
        &self,
        instrument: &Instrument,
        field: Field,
        window_length: usize,
        frequency: Frequency,
    ) -> Result<Vec<f64>, DataError>;
}

/// Maps ticker strings onto instruments.
pub trait SymbolResolver {
    fn resolve_symbol(&self, ticker: &str) -> Option<Instrument>;
}

/// Resolve a ticker list into a de-duplicated instrument universe.
///
/// Unknown tickers are logged and dropped; order of first appearance is kept.
pub fn resolve_universe(resolver: &dyn SymbolResolver, tickers: &[String]) -> Vec<Instrument> {
    let mut universe: Vec<Instrument> = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        match resolver.resolve_symbol(ticker) {
            Some(instrument) => {
                if !universe.contains(&instrument) {
                    universe.push(instrument);
                }
            }
            None => warn!(ticker = %ticker, "symbol not found, dropping from universe"),
        }
    }
    universe
}
