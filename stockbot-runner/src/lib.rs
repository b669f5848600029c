//! Stockbot Runner: replay harness for the stockbot algorithm.
//!
//! This crate builds on `stockbot-core` to provide:
//! - CSV bar loading and multi-symbol date alignment
//! - A replay market implementing the bar source and symbol resolver
//! - A paper broker implementing the order sink
//! - Replay orchestration and point-in-time ranking
//! - JSON/CSV export of run results

pub mod broker;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod market;
pub mod runner;

pub use broker::{OrderRecord, PaperBroker};
pub use config::{BacktestSection, RunConfig};
pub use data_loader::{load_bars, LoadError, LoadedData};
pub use export::{export_json, import_json, load_artifacts, save_artifacts};
pub use market::ReplayMarket;
pub use runner::{
    rank_asof, run_replay, run_replay_from_data, EquityPoint, RankSnapshot, RunError, RunResult,
};
