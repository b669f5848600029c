//! Trend-following strategies for the top-ranked set.
//!
//! `trade_trending` compares +DI against -DI over a `di_window + 1` bar
//! window. `trade_sar` compares the close against parabolic SAR over every
//! bar seen so far; the window grows with the step counter.

use crate::domain::{Field, Instrument, OrderInstruction};
use crate::error::StrategyError;
use crate::indicators::{DirectionalIndex, Indicator, ParabolicSar};

use super::{trade_each, Decision, TradeContext, HLC};

/// Bars needed before the DI strategy trades.
pub fn di_warmup(di_window: usize) -> usize {
    di_window + 1
}

/// Bars needed before the SAR strategy trades.
pub const SAR_WARMUP: usize = 2;

/// Long when +DI > -DI, short when -DI > +DI, close when equal.
pub fn trade_trending(
    ctx: &TradeContext<'_>,
    symbols: &[Instrument],
    active: &[Instrument],
    di_window: usize,
) -> Result<Vec<OrderInstruction>, StrategyError> {
    if ctx.step < di_warmup(di_window) {
        return Ok(Vec::new());
    }

    let di = DirectionalIndex::new(di_window);
    trade_each(
        "di",
        ctx,
        symbols,
        active,
        di_warmup(di_window),
        &HLC,
        |window| {
            let series = di.compute(window)?;
            let plus = series.plus.last().copied().unwrap_or(f64::NAN);
            let minus = series.minus.last().copied().unwrap_or(f64::NAN);
            Ok(Decision::compare(("+DI", plus), ("-DI", minus)))
        },
    )
}

/// Long when close > SAR, short when close < SAR, close when equal.
pub fn trade_sar(
    ctx: &TradeContext<'_>,
    symbols: &[Instrument],
    active: &[Instrument],
    accel: f64,
    accel_max: f64,
) -> Result<Vec<OrderInstruction>, StrategyError> {
    if ctx.step < SAR_WARMUP {
        return Ok(Vec::new());
    }

    let sar = ParabolicSar::new(accel, accel_max);
    trade_each("sar", ctx, symbols, active, ctx.step, &HLC, |window| {
        let series = sar.compute(window)?;
        let value = series.last().copied().unwrap_or(f64::NAN);
        let close = window.last(Field::Close).unwrap_or(f64::NAN);
        Ok(Decision::compare(("close", close), ("SAR", value)))
    })
}
