//! Domain types for stockbot

pub mod bar;
pub mod ids;
pub mod instrument;
pub mod order;
pub mod position;

pub use bar::{BarWindow, Field, Frequency, WindowError};
pub use ids::{ConfigHash, OrderId};
pub use instrument::Instrument;
pub use order::{OrderInstruction, OrderTarget, Signal};
pub use position::{Position, Positions};
