//! Order-target resolution shared by every strategy.

use crate::domain::{Instrument, Positions, Signal};

/// Signed target percent for `instrument` given a fresh `signal`.
///
/// A holder whose signal flips after the instrument left the `active` set is
/// closed instead of reversed. `Close` always targets zero.
pub fn resolve_target(
    instrument: &Instrument,
    signal: Signal,
    active: &[Instrument],
    positions: &Positions,
    capital_ppt: f64,
) -> f64 {
    let amount = positions.amount(instrument);
    let in_active = active.contains(instrument);

    match signal {
        Signal::Close => 0.0,
        Signal::Short if amount > 0.0 && !in_active => 0.0,
        Signal::Long if amount < 0.0 && !in_active => 0.0,
        Signal::Long => capital_ppt,
        Signal::Short => -capital_ppt,
    }
}

/// The signal an order actually carries once its target is resolved.
pub fn effective_signal(signal: Signal, target: f64) -> Signal {
    if target == 0.0 {
        Signal::Close
    } else {
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(sid: u32) -> Instrument {
        Instrument::new(sid, format!("S{sid}"))
    }

    #[test]
    fn long_and_short_targets_in_universe() {
        let active = vec![inst(1)];
        let positions = Positions::new();
        assert_eq!(resolve_target(&inst(1), Signal::Long, &active, &positions, 0.1), 0.1);
        assert_eq!(resolve_target(&inst(1), Signal::Short, &active, &positions, 0.1), -0.1);
        assert_eq!(resolve_target(&inst(1), Signal::Close, &active, &positions, 0.1), 0.0);
    }

    #[test]
    fn flip_outside_universe_closes() {
        let positions: Positions = [(inst(1), 10.0), (inst(2), -10.0)].into_iter().collect();
        let active = vec![inst(3)];

        assert_eq!(resolve_target(&inst(1), Signal::Short, &active, &positions, 0.1), 0.0);
        assert_eq!(resolve_target(&inst(2), Signal::Long, &active, &positions, 0.1), 0.0);
        // no flip: target stays sized
        assert_eq!(resolve_target(&inst(1), Signal::Long, &active, &positions, 0.1), 0.1);
    }

    #[test]
    fn flip_inside_universe_reverses() {
        let positions: Positions = [(inst(1), 10.0)].into_iter().collect();
        let active = vec![inst(1)];
        assert_eq!(resolve_target(&inst(1), Signal::Short, &active, &positions, 0.2), -0.2);
    }

    #[test]
    fn zero_target_is_close() {
        assert_eq!(effective_signal(Signal::Short, 0.0), Signal::Close);
        assert_eq!(effective_signal(Signal::Short, -0.1), Signal::Short);
    }
}
