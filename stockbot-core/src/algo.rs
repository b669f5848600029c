//! The trading algorithm driven bar by bar by the backtesting host.
//!
//! Per bar:
//! 1. advance the step counter and log the clock
//! 2. re-rank the universe when due
//! 3. close positions that rotated out of every evaluated set
//! 4. run the configured strategies on their sets
//! 5. submit the collected orders
//!
//! Orders are planned against a snapshot of the sink's positions and then
//! submitted in one pass.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{StrategyConfig, System};
use crate::data::{resolve_universe, BarSource, SymbolResolver};
use crate::domain::{Instrument, OrderId, OrderInstruction, Positions};
use crate::error::StrategyError;
use crate::orders::{submit, OrderSink};
use crate::rank::{AdxRanker, RankEntry, RankSets, Ranker, Ranking};
use crate::strategy::{
    close_rotated, eligible_symbols, trade_oscillating, trade_sar, trade_top_bot, trade_trending,
    TradeContext,
};

/// Host-facing lifecycle.
pub trait Algorithm {
    /// Resolve symbols and validate the configuration. Called once.
    fn initialize(&mut self, resolver: &dyn SymbolResolver) -> Result<(), StrategyError>;

    /// Process one bar and submit this step's orders.
    fn handle_bar(
        &mut self,
        clock: NaiveDateTime,
        source: &dyn BarSource,
        sink: &mut dyn OrderSink,
    ) -> Result<StepReport, StrategyError>;
}

/// What happened on one step.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub ranked: bool,
    pub orders: Vec<(OrderId, OrderInstruction)>,
}

/// Mutable state carried across bars.
#[derive(Debug, Clone, Default)]
pub struct StrategyState {
    pub step: usize,
    pub universe: Vec<Instrument>,
    pub ranking: Ranking,
    pub sets: RankSets,
    pub last_rank_step: Option<usize>,
}

pub struct StockBot {
    config: StrategyConfig,
    ranker: Box<dyn Ranker>,
    state: StrategyState,
    initialized: bool,
}

impl StockBot {
    /// Build with the ADX ranker implied by `config`.
    pub fn new(config: StrategyConfig) -> Result<Self, StrategyError> {
        let ranker = AdxRanker::new(config.di_window, config.frequency, config.fill_policy());
        Self::with_ranker(config, Box::new(ranker))
    }

    pub fn with_ranker(
        config: StrategyConfig,
        ranker: Box<dyn Ranker>,
    ) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self {
            config,
            ranker,
            state: StrategyState::default(),
            initialized: false,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn state(&self) -> &StrategyState {
        &self.state
    }

    fn rank_due(&self) -> bool {
        if !self.ranker.is_ready(self.state.step) {
            return false;
        }
        match self.state.last_rank_step {
            None => true,
            Some(last) => self.state.step - last >= self.config.rank_every,
        }
    }

    fn rerank(&mut self, source: &dyn BarSource) -> Result<(), StrategyError> {
        let ranking = self.ranker.rank(source, &self.state.universe)?;
        let sets = ranking.split(self.config.top_rank, self.config.bot_rank);

        info!(
            strategy = %self.config.name,
            ranker = self.ranker.name(),
            ranked = ranking.len(),
            top = %format_entries(&sets.top),
            bottom = %format_entries(&sets.bot),
            "re-ranked universe"
        );

        self.state.ranking = ranking;
        self.state.sets = sets;
        self.state.last_rank_step = Some(self.state.step);
        Ok(())
    }

    /// Orders for this step against a positions snapshot.
    fn plan(
        &self,
        source: &dyn BarSource,
        positions: &Positions,
        ranked: bool,
    ) -> Result<Vec<OrderInstruction>, StrategyError> {
        let capital_ppt = self.config.capital_ppt();

        if self.config.system == System::RankLongShort {
            if !ranked {
                return Ok(Vec::new());
            }
            return Ok(trade_top_bot(positions, &self.state.sets, capital_ppt));
        }

        let ctx = TradeContext {
            source,
            positions,
            step: self.state.step,
            frequency: self.config.frequency,
            fill: self.config.fill_policy(),
            capital_ppt,
        };

        let top = self.state.sets.top_instruments();
        let bot = self.state.sets.bot_instruments();
        let trending = eligible_symbols(&top, positions, &bot, self.config.max_pos);
        // holdings outside the bottom set never crowd out new oscillator picks
        let mut osc_exclude = trending.clone();
        osc_exclude.extend(
            positions
                .held()
                .map(|(instrument, _)| instrument)
                .filter(|instrument| !bot.contains(instrument))
                .cloned(),
        );
        let oscillating = eligible_symbols(&bot, positions, &osc_exclude, self.config.max_pos);

        let evaluated: Vec<Instrument> = trending.iter().chain(&oscillating).cloned().collect();
        let mut orders = close_rotated(positions, &evaluated);

        orders.extend(match self.config.system {
            System::AdxDiSo => trade_trending(&ctx, &trending, &top, self.config.di_window)?,
            _ => trade_sar(
                &ctx,
                &trending,
                &top,
                self.config.accel,
                self.config.accel_max,
            )?,
        });
        orders.extend(trade_oscillating(
            &ctx,
            &oscillating,
            &bot,
            self.config.so_window,
        )?);

        Ok(orders)
    }
}

impl Algorithm for StockBot {
    fn initialize(&mut self, resolver: &dyn SymbolResolver) -> Result<(), StrategyError> {
        let universe = resolve_universe(resolver, &self.config.symbols);
        self.config.validate_universe(universe.len())?;

        info!(
            strategy = %self.config.name,
            system = ?self.config.system,
            universe = universe.len(),
            capital_ppt = self.config.capital_ppt(),
            fingerprint = %self.config.fingerprint().short(),
            "initialized"
        );

        self.state = StrategyState {
            universe,
            ..StrategyState::default()
        };
        self.initialized = true;
        Ok(())
    }

    fn handle_bar(
        &mut self,
        clock: NaiveDateTime,
        source: &dyn BarSource,
        sink: &mut dyn OrderSink,
    ) -> Result<StepReport, StrategyError> {
        if !self.initialized {
            return Err(StrategyError::NotInitialized);
        }

        self.state.step += 1;
        info!(strategy = %self.config.name, step = self.state.step, "processing {clock}");

        let ranked = self.rank_due();
        if ranked {
            self.rerank(source)?;
        }

        let positions = sink.positions().clone();
        let instructions = self.plan(source, &positions, ranked)?;

        let mut orders = Vec::with_capacity(instructions.len());
        for instruction in instructions {
            let id = submit(sink, &instruction)?;
            debug!(order = %id, symbol = %instruction.instrument, "submitted");
            orders.push((id, instruction));
        }

        Ok(StepReport {
            step: self.state.step,
            ranked,
            orders,
        })
    }
}

fn format_entries(entries: &[RankEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}({:.2})", e.instrument, e.value))
        .collect::<Vec<_>>()
        .join(", ")
}
