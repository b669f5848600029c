//! Bar access, fill policy, and multi-symbol alignment

pub mod align;
pub mod fill;
pub mod provider;

pub use align::{align_symbols, AlignedData, DailyBar};
pub use fill::{fill_gaps, missing_fraction, prepare_window, FillMethod, FillPolicy};
pub use provider::{resolve_universe, BarSource, DataError, SymbolResolver};
