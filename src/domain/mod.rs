//! Domain Layer - Core types and pure numeric logic
//!
//! Everything here is deterministic computation over already-fetched
//! data; external interactions happen through the ports layer.

pub mod contract;
pub mod kelly;
pub mod portfolio;
pub mod regime;
pub mod returns;
pub mod signal;

pub use contract::{ContractSelector, OptionContract, OptionType, CONTRACT_MULTIPLIER};
pub use kelly::{AllocationDecision, KellySizer, SizingError};
pub use portfolio::Portfolio;
pub use regime::{
    KellyMultipliers, RegimeClassifier, RegimeInputs, RegimeState, RegimeThresholds,
};
pub use returns::{PricePoint, ReturnSeries};
pub use signal::{TradeAction, TradeSignal, VolatilitySignal};
