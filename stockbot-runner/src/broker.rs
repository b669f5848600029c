//! Paper broker: fills target orders immediately at the last known close.
//!
//! Percent targets are converted to whole shares against current portfolio
//! value. Cash and positions update as soon as an order is accepted, and
//! every accepted order is recorded.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockbot_core::domain::{Instrument, OrderId, Positions};
use stockbot_core::orders::{OrderError, OrderSink};

use crate::market::ReplayMarket;

/// One accepted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub date: Option<NaiveDate>,
    pub symbol: String,
    /// Requested portfolio fraction, when the order was a percent target.
    pub target_percent: Option<f64>,
    pub target_shares: f64,
    /// Shares traded (signed).
    pub filled_shares: f64,
    pub price: f64,
}

#[derive(Debug, Clone)]
pub struct PaperBroker {
    cash: f64,
    positions: Positions,
    prices: BTreeMap<Instrument, f64>,
    date: Option<NaiveDate>,
    orders: Vec<OrderRecord>,
    next_id: u64,
    pending_percent: Option<f64>,
}

impl PaperBroker {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            positions: Positions::new(),
            prices: BTreeMap::new(),
            date: None,
            orders: Vec::new(),
            next_id: 0,
            pending_percent: None,
        }
    }

    /// Refresh prices from the market's current bar.
    pub fn mark(&mut self, market: &ReplayMarket) {
        self.date = market.current_date();
        for instrument in market.instruments() {
            if let Some(close) = market.last_close(instrument) {
                self.prices.insert(instrument.clone(), close);
            }
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Cash plus marked value of every position.
    pub fn equity(&self) -> f64 {
        self.cash
            + self
                .positions
                .held()
                .map(|(instrument, position)| {
                    position.amount * self.prices.get(instrument).copied().unwrap_or(0.0)
                })
                .sum::<f64>()
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }

    pub fn into_orders(self) -> Vec<OrderRecord> {
        self.orders
    }

    /// Last marked close; a missing or non-positive close has no usable price.
    fn price(&self, instrument: &Instrument) -> Result<f64, OrderError> {
        self.prices
            .get(instrument)
            .copied()
            .filter(|price| *price > 0.0)
            .ok_or_else(|| OrderError::NoPrice {
                symbol: instrument.symbol.clone(),
            })
    }
}

impl OrderSink for PaperBroker {
    fn order_target_percent(
        &mut self,
        instrument: &Instrument,
        target: f64,
    ) -> Result<OrderId, OrderError> {
        if !target.is_finite() || target.abs() > 1.0 {
            return Err(OrderError::InvalidTarget {
                symbol: instrument.symbol.clone(),
                target,
            });
        }
        let price = self.price(instrument)?;
        let shares = (self.equity() * target / price).trunc();

        self.pending_percent = Some(target);
        let result = self.order_target(instrument, shares);
        self.pending_percent = None;
        result
    }

    fn order_target(&mut self, instrument: &Instrument, shares: f64) -> Result<OrderId, OrderError> {
        if !shares.is_finite() {
            return Err(OrderError::InvalidTarget {
                symbol: instrument.symbol.clone(),
                target: shares,
            });
        }
        // normalize -0.0 from truncating small short targets
        let shares = if shares == 0.0 { 0.0 } else { shares };
        let price = self.price(instrument)?;
        let delta = shares - self.positions.amount(instrument);

        self.cash -= delta * price;
        self.positions.set(instrument.clone(), shares);

        self.next_id += 1;
        let id = OrderId(self.next_id);
        self.orders.push(OrderRecord {
            id,
            date: self.date,
            symbol: instrument.symbol.clone(),
            target_percent: self.pending_percent,
            target_shares: shares,
            filled_shares: delta,
            price,
        });
        Ok(id)
    }

    fn positions(&self) -> &Positions {
        &self.positions
    }
}
