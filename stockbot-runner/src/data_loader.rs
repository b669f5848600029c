//! Bar loading for the replay harness.
//!
//! Reads one `<SYMBOL>.csv` per symbol from a directory, with header
//! `date,open,high,low,close[,volume]`, and aligns everything to a common
//! date axis. A symbol without a file is logged and dropped; it then fails
//! symbol resolution like any other unknown ticker.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use stockbot_core::data::{align_symbols, AlignedData, DailyBar};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("none of the {requested} requested symbols has a bar file")]
    NoData { requested: usize },
}

/// Result of loading bars.
#[derive(Debug, Clone)]
pub struct LoadedData {
    /// Aligned bar data for every symbol that had a file.
    pub aligned: AlignedData,
    /// Requested symbols without a file.
    pub missing: Vec<String>,
    /// Dataset hash for fingerprinting (BLAKE3 over all bar data).
    pub dataset_hash: String,
}

/// Load and align bars for `symbols` from `dir`.
pub fn load_bars(dir: &Path, symbols: &[String]) -> Result<LoadedData, LoadError> {
    let mut all_bars: HashMap<String, Vec<DailyBar>> = HashMap::new();
    let mut missing = Vec::new();

    for symbol in symbols {
        if all_bars.contains_key(symbol) || missing.contains(symbol) {
            continue;
        }
        let path = dir.join(format!("{symbol}.csv"));
        if !path.is_file() {
            warn!(symbol = %symbol, path = %path.display(), "no bar file, dropping symbol");
            missing.push(symbol.clone());
            continue;
        }
        let bars = read_bars_csv(&path)?;
        info!(symbol = %symbol, bars = bars.len(), "loaded");
        all_bars.insert(symbol.clone(), bars);
    }

    if all_bars.is_empty() {
        return Err(LoadError::NoData {
            requested: symbols.len(),
        });
    }

    let aligned = align_symbols(all_bars);
    let dataset_hash = compute_dataset_hash(&aligned);

    Ok(LoadedData {
        aligned,
        missing,
        dataset_hash,
    })
}

/// Read one symbol's CSV, sorted by date.
pub fn read_bars_csv(path: &Path) -> Result<Vec<DailyBar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut bars = Vec::new();
    for record in reader.deserialize::<DailyBar>() {
        let bar = record.map_err(|source| LoadError::Csv {
            path: path.display().to_string(),
            source,
        })?;
        bars.push(bar);
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Compute a deterministic BLAKE3 hash over all bar data.
///
/// `AlignedData` keeps symbols in a sorted map, so iteration order is stable.
fn compute_dataset_hash(aligned: &AlignedData) -> String {
    let mut hasher = blake3::Hasher::new();

    for (symbol, bars) in &aligned.bars {
        hasher.update(symbol.as_bytes());
        for bar in bars {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
    }

    hasher.finalize().to_hex().to_string()
}
