//! Stockbot Core: ranking, indicators, strategies, and the bar-driven algorithm.
//!
//! This crate contains the trading logic, independent of any data store or
//! broker:
//! - Domain types (instruments, bar windows, signals, order instructions, positions)
//! - Bar source / order sink / symbol resolver seams implemented by the host
//! - Fill policy for missing data
//! - Wilder indicators: DI, ADX, stochastic, parabolic SAR
//! - ADX ranking into top and bottom sets
//! - Trend, oscillator, and long/short strategies
//! - The `StockBot` algorithm tying them together

pub mod algo;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod orders;
pub mod rank;
pub mod strategy;

pub use algo::{Algorithm, StepReport, StockBot, StrategyState};
pub use config::{ConfigError, StrategyConfig, System};
pub use error::StrategyError;
