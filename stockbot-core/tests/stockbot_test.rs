//! End-to-end tests for the StockBot algorithm against scripted collaborators.
//!
//! Tests:
//! 1. No orders and no ranking before the ranker is ready
//! 2. A position that rotates out of the ranked sets is closed next step
//! 3. Unresolvable tickers are dropped at initialization
//! 4. rank_long_short longs the top set and shorts the bottom set on rank steps
//! 5. max_pos keeps held positions under evaluation
//! 6. Trend holdings over the cap never displace the oscillator's bottom pick

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use stockbot_core::config::{StrategyConfig, System};
use stockbot_core::data::{BarSource, DataError, SymbolResolver};
use stockbot_core::domain::{Field, Frequency, Instrument, OrderId, OrderTarget, Positions, Signal};
use stockbot_core::error::StrategyError;
use stockbot_core::orders::{OrderError, OrderSink};
use stockbot_core::rank::{Ranker, Ranking};
use stockbot_core::{Algorithm, StockBot};

// ── Collaborators ────────────────────────────────────────────────────

const UNIVERSE: [&str; 4] = ["AAA", "BBB", "CCC", "YYY"];

/// Resolves the fixed universe; everything else is unknown.
struct Resolver;

impl SymbolResolver for Resolver {
    fn resolve_symbol(&self, symbol: &str) -> Option<Instrument> {
        UNIVERSE
            .iter()
            .position(|s| *s == symbol)
            .map(|i| Instrument::new(i as u32 + 1, symbol))
    }
}

fn instrument(symbol: &str) -> Instrument {
    Resolver.resolve_symbol(symbol).unwrap()
}

/// Every instrument trends up one point per bar; history grows with the step.
#[derive(Default)]
struct Uptrend {
    step: Cell<usize>,
    requested: RefCell<Vec<(usize, String)>>,
}

impl Uptrend {
    fn requested_at(&self, step: usize) -> BTreeSet<String> {
        self.requested
            .borrow()
            .iter()
            .filter(|(s, _)| *s == step)
            .map(|(_, symbol)| symbol.clone())
            .collect()
    }
}

impl BarSource for Uptrend {
    fn history(
        &self,
        instrument: &Instrument,
        field: Field,
        window_length: usize,
        _frequency: Frequency,
    ) -> Result<Vec<f64>, DataError> {
        let end = self.step.get();
        self.requested
            .borrow_mut()
            .push((end, instrument.symbol.clone()));
        let start = end.saturating_sub(window_length);
        Ok((start..end)
            .map(|i| {
                let mid = 100.0 + i as f64;
                match field {
                    Field::High => mid + 1.0,
                    Field::Low => mid - 1.0,
                    Field::Open | Field::Close => mid,
                }
            })
            .collect())
    }
}

/// Returns pre-scripted rankings in order, repeating the last one.
struct ScriptedRanker {
    script: Vec<Vec<(&'static str, f64)>>,
    calls: Cell<usize>,
}

impl Ranker for ScriptedRanker {
    fn name(&self) -> &str {
        "scripted"
    }

    fn is_ready(&self, step: usize) -> bool {
        step >= 3
    }

    fn rank(&self, _source: &dyn BarSource, _universe: &[Instrument]) -> Result<Ranking, StrategyError> {
        let i = self.calls.get().min(self.script.len() - 1);
        self.calls.set(self.calls.get() + 1);
        Ok(Ranking::from_values(
            self.script[i].iter().map(|(s, v)| (instrument(s), *v)),
        ))
    }
}

/// Records percent orders; positions are set by the test.
#[derive(Default)]
struct Recorder {
    positions: Positions,
    orders: RefCell<Vec<(usize, String, f64)>>,
    step: usize,
    next_id: u64,
}

impl OrderSink for Recorder {
    fn order_target_percent(&mut self, instrument: &Instrument, target: f64) -> Result<OrderId, OrderError> {
        self.orders
            .borrow_mut()
            .push((self.step, instrument.symbol.clone(), target));
        self.next_id += 1;
        Ok(OrderId(self.next_id))
    }

    fn order_target(&mut self, instrument: &Instrument, _shares: f64) -> Result<OrderId, OrderError> {
        Err(OrderError::InvalidTarget {
            symbol: instrument.symbol.clone(),
            target: f64::NAN,
        })
    }

    fn positions(&self) -> &Positions {
        &self.positions
    }
}

fn config(system: System) -> StrategyConfig {
    StrategyConfig {
        name: "test".into(),
        system,
        symbols: UNIVERSE.iter().map(|s| s.to_string()).collect(),
        top_rank: 1,
        bot_rank: 1,
        di_window: 2,
        so_window: 2,
        ..StrategyConfig::default()
    }
}

fn clock(step: usize) -> NaiveDateTime {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    (start + chrono::Duration::days(step as i64))
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn run_steps(
    bot: &mut StockBot,
    source: &Uptrend,
    sink: &mut Recorder,
    steps: std::ops::RangeInclusive<usize>,
) {
    for step in steps {
        source.step.set(step);
        sink.step = step;
        bot.handle_bar(clock(step), source, sink).unwrap();
    }
}

fn orders_at(sink: &Recorder, step: usize) -> Vec<(String, f64)> {
    sink.orders
        .borrow()
        .iter()
        .filter(|(s, _, _)| *s == step)
        .map(|(_, symbol, target)| (symbol.clone(), *target))
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn warmup_emits_nothing() {
    let mut bot = StockBot::new(config(System::AdxSarSo)).unwrap();
    bot.initialize(&Resolver).unwrap();
    let source = Uptrend::default();
    let mut sink = Recorder::default();

    // ADX ranker needs 2 * di_window = 4 bars
    run_steps(&mut bot, &source, &mut sink, 1..=3);
    assert!(sink.orders.borrow().is_empty());
    assert!(bot.state().last_rank_step.is_none());
    assert_eq!(bot.state().step, 3);
}

#[test]
fn rotated_holder_is_closed() {
    let ranker = ScriptedRanker {
        script: vec![
            vec![("YYY", 40.0), ("AAA", 30.0), ("BBB", 20.0), ("CCC", 10.0)],
            vec![("AAA", 40.0), ("BBB", 30.0), ("YYY", 20.0), ("CCC", 10.0)],
        ],
        calls: Cell::new(0),
    };
    let mut bot = StockBot::with_ranker(config(System::AdxSarSo), Box::new(ranker)).unwrap();
    bot.initialize(&Resolver).unwrap();

    let source = Uptrend::default();
    let mut sink = Recorder {
        positions: [(instrument("YYY"), 10.0)].into_iter().collect(),
        ..Recorder::default()
    };

    // step 3: YYY tops the ranking and is already long in an uptrend
    run_steps(&mut bot, &source, &mut sink, 1..=3);
    assert!(orders_at(&sink, 3).iter().all(|(s, _)| s != "YYY"));

    // step 4: YYY drops to the middle of the ranking
    run_steps(&mut bot, &source, &mut sink, 4..=4);
    let yyy: Vec<f64> = orders_at(&sink, 4)
        .into_iter()
        .filter(|(s, _)| s == "YYY")
        .map(|(_, t)| t)
        .collect();
    assert_eq!(yyy, vec![0.0]);
    assert_eq!(bot.state().sets.top_instruments(), vec![instrument("AAA")]);
}

#[test]
fn unknown_tickers_are_dropped() {
    let mut config = config(System::AdxDiSo);
    config.symbols.push("NOPE".into());
    config.symbols.push("AAA".into());

    let mut bot = StockBot::new(config).unwrap();
    bot.initialize(&Resolver).unwrap();
    assert_eq!(bot.state().universe.len(), 4);
}

#[test]
fn long_short_trades_on_rank_steps_only() {
    let ranker = ScriptedRanker {
        script: vec![vec![("AAA", 40.0), ("BBB", 30.0), ("CCC", 20.0), ("YYY", 10.0)]],
        calls: Cell::new(0),
    };
    let mut config = config(System::RankLongShort);
    config.rank_every = 3;
    let mut bot = StockBot::with_ranker(config, Box::new(ranker)).unwrap();
    bot.initialize(&Resolver).unwrap();

    let source = Uptrend::default();
    let mut sink = Recorder::default();
    run_steps(&mut bot, &source, &mut sink, 1..=5);

    assert_eq!(
        orders_at(&sink, 3),
        vec![("AAA".to_string(), 0.5), ("YYY".to_string(), -0.5)]
    );
    assert!(orders_at(&sink, 4).is_empty());
    assert!(orders_at(&sink, 5).is_empty());
}

#[test]
fn max_pos_keeps_holdings_under_evaluation() {
    let ranker = ScriptedRanker {
        script: vec![vec![("AAA", 40.0), ("BBB", 30.0), ("CCC", 20.0), ("YYY", 10.0)]],
        calls: Cell::new(0),
    };
    let mut config = config(System::AdxSarSo);
    config.max_pos = Some(2);
    let mut bot = StockBot::with_ranker(config, Box::new(ranker)).unwrap();
    bot.initialize(&Resolver).unwrap();

    let source = Uptrend::default();
    // BBB is outside both sets but held: it stays under the trend strategy
    let mut sink = Recorder {
        positions: [(instrument("BBB"), 5.0)].into_iter().collect(),
        ..Recorder::default()
    };
    run_steps(&mut bot, &source, &mut sink, 1..=3);

    let orders = orders_at(&sink, 3);
    assert!(orders.iter().all(|(s, _)| s != "BBB"));
    assert!(orders.contains(&("AAA".to_string(), 0.5)));
}

#[test]
fn capped_trend_holding_does_not_crowd_out_bottom_pick() {
    let ranker = ScriptedRanker {
        script: vec![vec![("AAA", 40.0), ("BBB", 30.0), ("CCC", 20.0), ("YYY", 10.0)]],
        calls: Cell::new(0),
    };
    let mut config = config(System::AdxSarSo);
    config.max_pos = Some(1);
    let mut bot = StockBot::with_ranker(config, Box::new(ranker)).unwrap();
    bot.initialize(&Resolver).unwrap();

    // AAA fills the single trend slot; BBB is held but ranked in neither set
    let source = Uptrend::default();
    let mut sink = Recorder {
        positions: [(instrument("AAA"), 5.0), (instrument("BBB"), 5.0)]
            .into_iter()
            .collect(),
        ..Recorder::default()
    };
    run_steps(&mut bot, &source, &mut sink, 1..=6);

    // stochastic warmup for so_window 2 ends at step 6
    let requested = source.requested_at(6);
    assert!(requested.contains("YYY"));
    assert!(!requested.contains("BBB"));
    assert!(orders_at(&sink, 6).contains(&("BBB".to_string(), 0.0)));
}

#[test]
fn signals_are_typed() {
    // guard against serde renames drifting from the log/CSV vocabulary
    assert_eq!(serde_json::to_string(&Signal::Close).unwrap(), "\"close\"");
    assert_eq!(
        serde_json::to_string(&OrderTarget::Percent(0.5)).unwrap(),
        r#"{"kind":"percent","value":0.5}"#
    );
}
