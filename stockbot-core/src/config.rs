//! Strategy configuration: immutable after initialization.
//!
//! Deserialized from TOML. Defaults match the `adx_sar_so` system:
//! five trending and five oscillating instruments, 14-bar DI and stochastic
//! windows, back-fill with a 0.34 missing limit, re-rank every step.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::data::{FillMethod, FillPolicy};
use crate::domain::{ConfigHash, Frequency};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("no symbol in the universe could be resolved")]
    EmptyUniverse,

    #[error(
        "universe of {universe} instruments is too small for top_rank {top_rank} + bot_rank {bot_rank}; top and bottom sets would overlap"
    )]
    RankOverlap {
        universe: usize,
        top_rank: usize,
        bot_rank: usize,
    },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Which ranking/trading combination an algorithm runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum System {
    /// Directional-indicator trend following on the top set, stochastic on the bottom set.
    AdxDiSo,
    /// Parabolic SAR trend following on the top set, stochastic on the bottom set.
    #[default]
    AdxSarSo,
    /// Long the top set, short the bottom set, close everything else.
    RankLongShort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyConfig {
    /// Name used in log lines.
    pub name: String,
    pub system: System,
    /// Ticker universe, resolved once at initialization.
    pub symbols: Vec<String>,
    /// Capital fraction per instrument. Defaults to `1 / (top_rank + bot_rank)`.
    pub capital_ppt: Option<f64>,
    pub fillna: FillMethod,
    pub fillna_limit: f64,
    pub top_rank: usize,
    pub bot_rank: usize,
    pub di_window: usize,
    pub so_window: usize,
    pub accel: f64,
    pub accel_max: f64,
    /// Steps between re-rankings.
    pub rank_every: usize,
    /// Cap on instruments evaluated per strategy per step.
    pub max_pos: Option<usize>,
    pub frequency: Frequency,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            name: "adx_sar_so".into(),
            system: System::AdxSarSo,
            symbols: Vec::new(),
            capital_ppt: None,
            fillna: FillMethod::Backward,
            fillna_limit: 0.34,
            top_rank: 5,
            bot_rank: 5,
            di_window: 14,
            so_window: 14,
            accel: 0.02,
            accel_max: 0.2,
            rank_every: 1,
            max_pos: None,
            frequency: Frequency::Daily,
        }
    }
}

impl StrategyConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Check parameter ranges that do not depend on the resolved universe.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.fillna_limit) {
            return Err(invalid(
                "fillna_limit",
                format!("{} is outside [0, 1]", self.fillna_limit),
            ));
        }
        if self.di_window == 0 {
            return Err(invalid("di_window", "must be >= 1"));
        }
        if self.so_window == 0 {
            return Err(invalid("so_window", "must be >= 1"));
        }
        if self.rank_every == 0 {
            return Err(invalid("rank_every", "must be >= 1"));
        }
        if self.accel.is_nan() || self.accel <= 0.0 {
            return Err(invalid("accel", format!("{} must be > 0", self.accel)));
        }
        if self.accel_max.is_nan() || self.accel_max < self.accel {
            return Err(invalid(
                "accel_max",
                format!("{} must be >= accel {}", self.accel_max, self.accel),
            ));
        }
        if self.max_pos == Some(0) {
            return Err(invalid("max_pos", "must be >= 1 when set"));
        }
        match self.capital_ppt {
            Some(c) if c.is_nan() || c <= 0.0 || c > 1.0 => {
                Err(invalid("capital_ppt", format!("{c} is outside (0, 1]")))
            }
            Some(_) => Ok(()),
            None if self.top_rank + self.bot_rank == 0 => Err(invalid(
                "capital_ppt",
                "cannot derive a default when top_rank + bot_rank is 0",
            )),
            None => Ok(()),
        }
    }

    /// Check the resolved universe size against the rank counts.
    pub fn validate_universe(&self, universe: usize) -> Result<(), ConfigError> {
        if universe == 0 {
            return Err(ConfigError::EmptyUniverse);
        }
        if universe <= self.top_rank + self.bot_rank {
            return Err(ConfigError::RankOverlap {
                universe,
                top_rank: self.top_rank,
                bot_rank: self.bot_rank,
            });
        }
        Ok(())
    }

    /// Capital fraction per instrument, explicit or derived from the rank counts.
    ///
    /// Only meaningful after `validate` succeeded.
    pub fn capital_ppt(&self) -> f64 {
        self.capital_ppt
            .unwrap_or_else(|| 1.0 / (self.top_rank + self.bot_rank) as f64)
    }

    pub fn fill_policy(&self) -> FillPolicy {
        FillPolicy::new(self.fillna, self.fillna_limit)
    }

    /// Deterministic hash of the full configuration.
    pub fn fingerprint(&self) -> ConfigHash {
        // Struct fields serialize in declaration order, so the JSON is canonical.
        match serde_json::to_string(self) {
            Ok(json) => ConfigHash::from_bytes(json.as_bytes()),
            Err(_) => ConfigHash::from_bytes(format!("{self:?}").as_bytes()),
        }
    }
}
