//! Order sink: the backtesting engine's position/order API, seen from the core.

use thiserror::Error;

use crate::domain::{Instrument, OrderId, OrderInstruction, OrderTarget, Positions};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("unknown instrument: {symbol}")]
    UnknownInstrument { symbol: String },

    #[error("no price available for {symbol}")]
    NoPrice { symbol: String },

    #[error("invalid target {target} for {symbol}")]
    InvalidTarget { symbol: String, target: f64 },
}

/// Accepts target orders and reports current positions.
///
/// Orders are submitted, not applied, from the core's point of view: the
/// position table is only read, and may or may not reflect an order until
/// the sink processes it.
pub trait OrderSink {
    /// Order enough to hold `target` (signed fraction of portfolio value).
    fn order_target_percent(
        &mut self,
        instrument: &Instrument,
        target: f64,
    ) -> Result<OrderId, OrderError>;

    /// Order enough to hold `shares` (signed share count).
    fn order_target(&mut self, instrument: &Instrument, shares: f64) -> Result<OrderId, OrderError>;

    fn positions(&self) -> &Positions;
}

/// Route an instruction to the matching sink call.
pub fn submit(
    sink: &mut dyn OrderSink,
    instruction: &OrderInstruction,
) -> Result<OrderId, OrderError> {
    match instruction.target {
        OrderTarget::Percent(target) => sink.order_target_percent(&instruction.instrument, target),
        OrderTarget::Shares(shares) => sink.order_target(&instruction.instrument, shares),
    }
}
