use thiserror::Error;

use crate::config::ConfigError;
use crate::data::DataError;
use crate::indicators::IndicatorError;
use crate::orders::OrderError;

/// Fatal errors that stop a run.
///
/// Recoverable conditions (unresolved tickers, rejected windows, undefined
/// indicator values) are logged and skipped where they occur and never
/// surface here.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("algorithm used before initialize()")]
    NotInitialized,
}
