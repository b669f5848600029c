//! Replay runner: drives `StockBot` across loaded data with a paper broker.
//!
//! Two entry points:
//! - `run_replay()`: loads bars from the configured directory, then runs. Used by CLI.
//! - `run_replay_from_data()`: takes pre-loaded data. Used by tests.
//!
//! `rank_asof()` evaluates the ranking alone at one date.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use stockbot_core::config::{ConfigError, StrategyConfig, System};
use stockbot_core::data::resolve_universe;
use stockbot_core::error::StrategyError;
use stockbot_core::orders::OrderSink;
use stockbot_core::rank::{AdxRanker, RankSets, Ranker, Ranking};
use stockbot_core::{Algorithm, StockBot};

use crate::broker::{OrderRecord, PaperBroker};
use crate::config::RunConfig;
use crate::data_loader::{load_bars, LoadError, LoadedData};
use crate::market::ReplayMarket;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),
    #[error("no trading dates in range {start} to {end}")]
    EmptyRange { start: String, end: String },
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Complete result of one replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub name: String,
    pub system: System,
    pub config_fingerprint: String,
    pub dataset_hash: String,
    pub start_date: String,
    pub end_date: String,
    pub initial_capital: f64,
    pub final_equity: f64,
    pub bar_count: usize,
    pub rank_count: usize,
    /// Symbols that were requested but had no bar file.
    pub missing_symbols: Vec<String>,
    pub orders: Vec<OrderRecord>,
    pub equity_curve: Vec<EquityPoint>,
    /// Final share counts by symbol.
    pub final_positions: BTreeMap<String, f64>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RunResult {
    pub fn total_return(&self) -> f64 {
        self.final_equity / self.initial_capital - 1.0
    }
}

/// Ranking evaluated at a single date.
#[derive(Debug, Clone, Serialize)]
pub struct RankSnapshot {
    pub date: NaiveDate,
    pub ranking: Ranking,
    pub sets: RankSets,
}

/// Load the configured data and run the replay.
pub fn run_replay(config: &RunConfig) -> Result<RunResult, RunError> {
    config.validate()?;
    let loaded = load_bars(&config.backtest.data_dir, &config.strategy.symbols)?;
    run_replay_from_data(
        &config.strategy,
        loaded,
        config.backtest.start_date,
        config.backtest.end_date,
        config.backtest.initial_capital,
    )
}

/// Run the replay over pre-loaded data without touching the filesystem.
///
/// The algorithm sees every date in `[start, end]`; bars before `start`
/// stay visible as history.
pub fn run_replay_from_data(
    strategy: &StrategyConfig,
    loaded: LoadedData,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    initial_capital: f64,
) -> Result<RunResult, RunError> {
    let LoadedData {
        aligned,
        missing,
        dataset_hash,
    } = loaded;
    let mut market = ReplayMarket::new(aligned);

    let indices = trading_indices(market.dates(), start, end);
    let (Some(&first), Some(&last)) = (indices.first(), indices.last()) else {
        return Err(RunError::EmptyRange {
            start: date_or_open(start),
            end: date_or_open(end),
        });
    };
    let start_date = market.dates()[first];
    let end_date = market.dates()[last];

    let mut bot = StockBot::new(strategy.clone())?;
    bot.initialize(&market)?;

    let mut broker = PaperBroker::new(initial_capital);
    let mut equity_curve = Vec::with_capacity(indices.len());
    let mut rank_count = 0;

    for index in indices {
        market.seek(index);
        broker.mark(&market);
        let date = market.dates()[index];

        let report = bot.handle_bar(date.and_time(NaiveTime::MIN), &market, &mut broker)?;
        if report.ranked {
            rank_count += 1;
        }
        equity_curve.push(EquityPoint {
            date,
            equity: broker.equity(),
        });
    }

    let final_equity = broker.equity();
    let final_positions = broker
        .positions()
        .held()
        .map(|(instrument, position)| (instrument.symbol.clone(), position.amount))
        .collect();

    info!(
        strategy = %strategy.name,
        bars = equity_curve.len(),
        orders = broker.orders().len(),
        final_equity,
        "replay complete"
    );

    Ok(RunResult {
        schema_version: SCHEMA_VERSION,
        name: strategy.name.clone(),
        system: strategy.system,
        config_fingerprint: strategy.fingerprint().to_string(),
        dataset_hash,
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        initial_capital,
        final_equity,
        bar_count: equity_curve.len(),
        rank_count,
        missing_symbols: missing,
        orders: broker.into_orders(),
        equity_curve,
        final_positions,
    })
}

/// Rank the configured universe by ADX as of `asof` (default: last date).
pub fn rank_asof(config: &RunConfig, asof: Option<NaiveDate>) -> Result<RankSnapshot, RunError> {
    config.validate()?;
    let strategy = &config.strategy;
    let loaded = load_bars(&config.backtest.data_dir, &strategy.symbols)?;
    let mut market = ReplayMarket::new(loaded.aligned);

    let index = match asof {
        Some(date) => market.index_at_or_before(date),
        None => market.dates().len().checked_sub(1),
    };
    let Some(index) = index else {
        return Err(RunError::EmptyRange {
            start: date_or_open(None),
            end: date_or_open(asof),
        });
    };
    market.seek(index);

    let universe = resolve_universe(&market, &strategy.symbols);
    strategy.validate_universe(universe.len())?;

    let ranker = AdxRanker::new(strategy.di_window, strategy.frequency, strategy.fill_policy());
    let ranking = ranker.rank(&market, &universe)?;
    let sets = ranking.split(strategy.top_rank, strategy.bot_rank);

    Ok(RankSnapshot {
        date: market.dates()[index],
        ranking,
        sets,
    })
}

fn trading_indices(
    dates: &[NaiveDate],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<usize> {
    dates
        .iter()
        .enumerate()
        .filter(|(_, d)| start.map_or(true, |s| **d >= s) && end.map_or(true, |e| **d <= e))
        .map(|(i, _)| i)
        .collect()
}

fn date_or_open(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "..".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn trading_indices_respect_bounds() {
        let dates = vec![day(2), day(3), day(4), day(5)];
        assert_eq!(trading_indices(&dates, None, None), vec![0, 1, 2, 3]);
        assert_eq!(trading_indices(&dates, Some(day(3)), Some(day(4))), vec![1, 2]);
        assert!(trading_indices(&dates, Some(day(6)), None).is_empty());
    }
}
