//! Mean-reversion strategy for the bottom-ranked set.
//!
//! Compares slow %K against %D over a `so_window + 4` bar window: the
//! smallest window that defines the latest %D.

use crate::domain::{Instrument, OrderInstruction};
use crate::error::StrategyError;
use crate::indicators::{Indicator, Stochastic};

use super::{trade_each, Decision, TradeContext, HLC};

/// Bars needed before the stochastic strategy trades.
pub fn so_warmup(so_window: usize) -> usize {
    so_window + 4
}

/// Long when %K > %D, short when %K < %D, close when equal.
pub fn trade_oscillating(
    ctx: &TradeContext<'_>,
    symbols: &[Instrument],
    active: &[Instrument],
    so_window: usize,
) -> Result<Vec<OrderInstruction>, StrategyError> {
    if ctx.step < so_warmup(so_window) {
        return Ok(Vec::new());
    }

    let stoch = Stochastic::new(so_window);
    trade_each(
        "stoch",
        ctx,
        symbols,
        active,
        so_warmup(so_window),
        &HLC,
        |window| {
            let series = stoch.compute(window)?;
            let k = series.k.last().copied().unwrap_or(f64::NAN);
            let d = series.d.last().copied().unwrap_or(f64::NAN);
            Ok(Decision::compare(("%K", k), ("%D", d)))
        },
    )
}
