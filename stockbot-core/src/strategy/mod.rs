//! Trading strategies.
//!
//! Each strategy evaluates a list of instruments against one indicator and
//! returns the order instructions to submit this step. Strategies never
//! touch the order sink directly: the algorithm collects instructions and
//! submits them in one pass.
//!
//! Per instrument the flow is the same: pull a fill-policy-validated window,
//! compute the indicator, turn the latest values into a signal, resolve the
//! target, and drop orders that would not change the position.

pub mod long_short;
pub mod oscillator;
pub mod target;
pub mod trend;

pub use long_short::trade_top_bot;
pub use oscillator::trade_oscillating;
pub use target::{effective_signal, resolve_target};
pub use trend::{trade_sar, trade_trending};

use tracing::{debug, info, warn};

use crate::data::{prepare_window, BarSource, FillPolicy};
use crate::domain::{BarWindow, Field, Frequency, Instrument, OrderInstruction, Positions, Signal};
use crate::error::StrategyError;
use crate::indicators::IndicatorError;

pub(crate) const HLC: [Field; 3] = [Field::High, Field::Low, Field::Close];

/// Everything a strategy reads during one step.
#[derive(Clone, Copy)]
pub struct TradeContext<'a> {
    pub source: &'a dyn BarSource,
    pub positions: &'a Positions,
    /// Bars seen so far, starting at 1 on the first bar.
    pub step: usize,
    pub frequency: Frequency,
    pub fill: FillPolicy,
    pub capital_ppt: f64,
}

/// The latest indicator comparison behind a signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub signal: Signal,
    pub lhs: (&'static str, f64),
    pub rhs: (&'static str, f64),
}

impl Decision {
    /// Compare two latest values; `None` when either is undefined.
    pub fn compare(lhs: (&'static str, f64), rhs: (&'static str, f64)) -> Option<Self> {
        if lhs.1.is_nan() || rhs.1.is_nan() {
            return None;
        }
        Some(Self {
            signal: Signal::from_comparison(lhs.1, rhs.1),
            lhs,
            rhs,
        })
    }
}

/// Shared per-instrument loop.
///
/// `decide` returns `Ok(None)` when the latest indicator values are
/// undefined. Insufficient-data indicator errors skip the instrument; any
/// other error stops the step.
pub(crate) fn trade_each<F>(
    strategy: &'static str,
    ctx: &TradeContext<'_>,
    symbols: &[Instrument],
    active: &[Instrument],
    window_length: usize,
    fields: &[Field],
    mut decide: F,
) -> Result<Vec<OrderInstruction>, StrategyError>
where
    F: FnMut(&BarWindow) -> Result<Option<Decision>, IndicatorError>,
{
    let mut orders = Vec::new();

    for instrument in symbols {
        let Some(window) = prepare_window(
            ctx.source,
            instrument,
            window_length,
            ctx.frequency,
            fields,
            &ctx.fill,
        )?
        else {
            continue;
        };

        let decision = match decide(&window) {
            Ok(Some(decision)) => decision,
            Ok(None) => {
                warn!(strategy, symbol = %instrument, "indicator undefined, skipping");
                continue;
            }
            Err(e) if e.is_insufficient_data() => {
                warn!(strategy, symbol = %instrument, error = %e, "NaN inputs, skipping");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if !ctx.positions.needs_order(instrument, decision.signal) {
            debug!(
                strategy,
                symbol = %instrument,
                signal = %decision.signal,
                "position already matches signal"
            );
            continue;
        }

        let target = resolve_target(
            instrument,
            decision.signal,
            active,
            ctx.positions,
            ctx.capital_ppt,
        );
        let signal = effective_signal(decision.signal, target);
        info!(
            strategy,
            symbol = %instrument,
            signal = %signal,
            target,
            "{} {:.4} vs {} {:.4}",
            decision.lhs.0,
            decision.lhs.1,
            decision.rhs.0,
            decision.rhs.1,
        );
        orders.push(OrderInstruction::percent(instrument.clone(), signal, target));
    }

    Ok(orders)
}

/// Instruments a strategy evaluates this step.
///
/// Without a cap this is just `subset`. With `max_pos`, held positions come
/// first (minus anything in `exclude`), then the newly selected subset,
/// deduplicated and truncated to the cap.
pub fn eligible_symbols(
    subset: &[Instrument],
    positions: &Positions,
    exclude: &[Instrument],
    max_pos: Option<usize>,
) -> Vec<Instrument> {
    let Some(cap) = max_pos else {
        return subset.to_vec();
    };

    let mut out: Vec<Instrument> = Vec::with_capacity(cap);
    let held = positions
        .held()
        .map(|(instrument, _)| instrument)
        .filter(|instrument| !exclude.contains(instrument));

    for instrument in held.chain(subset) {
        if out.len() == cap {
            break;
        }
        if !out.contains(instrument) {
            out.push(instrument.clone());
        }
    }
    out
}

/// Close every held position that no strategy evaluates this step.
pub fn close_rotated(positions: &Positions, evaluated: &[Instrument]) -> Vec<OrderInstruction> {
    positions
        .held()
        .filter(|(instrument, _)| !evaluated.contains(instrument))
        .map(|(instrument, position)| {
            info!(
                symbol = %instrument,
                amount = position.amount,
                "left ranked sets, closing"
            );
            OrderInstruction::percent(instrument.clone(), Signal::Close, 0.0)
        })
        .collect()
}
