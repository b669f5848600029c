//! Serializable replay configuration.
//!
//! ```toml
//! [backtest]
//! data_dir = "data"
//! start_date = "2021-01-04"
//! end_date = "2023-12-29"
//! initial_capital = 100000.0
//!
//! [strategy]
//! system = "adx_sar_so"
//! symbols = ["AAPL", "MSFT", "XOM", "JNJ", "KO", "PG", "WMT", "CVX", "JPM", "BAC", "T"]
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use stockbot_core::config::{ConfigError, StrategyConfig};
use stockbot_core::domain::ConfigHash;

/// Everything needed to reproduce one replay run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub backtest: BacktestSection,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BacktestSection {
    /// Directory holding one `<SYMBOL>.csv` per symbol.
    pub data_dir: PathBuf,

    /// First date the algorithm sees (inclusive). Earlier bars remain
    /// available as history.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Last date the algorithm sees (inclusive).
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
}

fn default_initial_capital() -> f64 {
    100_000.0
}

impl RunConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read a config file; a relative `data_dir` is resolved against the
    /// file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if config.backtest.data_dir.is_relative() {
            if let Some(base) = path.parent() {
                config.backtest.data_dir = base.join(&config.backtest.data_dir);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.backtest;
        if b.initial_capital.is_nan() || b.initial_capital <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "initial_capital",
                reason: format!("{} must be > 0", b.initial_capital),
            });
        }
        if let (Some(start), Some(end)) = (b.start_date, b.end_date) {
            if start > end {
                return Err(ConfigError::Invalid {
                    field: "start_date",
                    reason: format!("{start} is after end_date {end}"),
                });
            }
        }
        self.strategy.validate()
    }

    /// Deterministic hash of the whole run configuration.
    pub fn run_id(&self) -> ConfigHash {
        match serde_json::to_string(self) {
            Ok(json) => ConfigHash::from_bytes(json.as_bytes()),
            Err(_) => ConfigHash::from_bytes(format!("{self:?}").as_bytes()),
        }
    }
}
