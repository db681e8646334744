//! Strategy Layer - Signal generation
//!
//! The volatility breakout detector is the core; SMA crossover and
//! buy-and-hold exist as configuration-selected variants for the
//! simulator.

pub mod buy_and_hold;
pub mod params;
pub mod sma_crossover;
pub mod traits;
pub mod volatility;

pub use params::{CrossoverConfig, DetectorConfig, ParamsError, SizingConfig};
pub use traits::{build_strategy, Sizing, Strategy, StrategyKind, StrategySignal};
pub use volatility::{VolatilityBreakoutStrategy, VolatilityDetector};
