//! Rank long/short: long the top set, short the bottom set, flatten the rest.

use tracing::info;

use crate::domain::{Instrument, OrderInstruction, Positions, Signal};
use crate::rank::RankSets;

use super::{effective_signal, resolve_target};

pub fn trade_top_bot(
    positions: &Positions,
    sets: &RankSets,
    capital_ppt: f64,
) -> Vec<OrderInstruction> {
    let top = sets.top_instruments();
    let bot = sets.bot_instruments();
    let active: Vec<Instrument> = top.iter().chain(&bot).cloned().collect();

    let wanted = top
        .iter()
        .map(|i| (i, Signal::Long))
        .chain(bot.iter().map(|i| (i, Signal::Short)));
    let stale = positions
        .held()
        .map(|(i, _)| i)
        .filter(|i| !active.contains(i))
        .map(|i| (i, Signal::Close));

    let mut orders = Vec::new();
    for (instrument, signal) in wanted.chain(stale) {
        if !positions.needs_order(instrument, signal) {
            continue;
        }
        let target = resolve_target(instrument, signal, &active, positions, capital_ppt);
        let signal = effective_signal(signal, target);
        info!(strategy = "rank_ls", symbol = %instrument, signal = %signal, target, "rebalance");
        orders.push(OrderInstruction::percent(instrument.clone(), signal, target));
    }
    orders
}
