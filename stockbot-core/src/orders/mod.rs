//! Order submission

pub mod sink;

pub use sink::{submit, OrderError, OrderSink};
