//! Strategy Capability Trait
//!
//! A strategy consumes market data and produces zero or more signals.
//! Variants are selected by configuration, not subclassing: the
//! simulator and the CLI pick an implementation by `StrategyKind`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::returns::PricePoint;
use crate::domain::signal::TradeAction;
use crate::strategy::params::{CrossoverConfig, DetectorConfig};

/// How a strategy sizes its signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    /// Fixed share count
    Shares(u32),
    /// Dollar allocation to be converted at execution price
    Dollars(f64),
}

/// A directional signal from a strategy
#[derive(Debug, Clone, PartialEq)]
pub struct StrategySignal {
    pub symbol: String,
    pub action: TradeAction,
    pub sizing: Sizing,
    pub strategy_tag: String,
}

/// Capability interface: consume bars, emit signals
pub trait Strategy: Send {
    fn name(&self) -> &str;

    /// Feed the latest bar history for a symbol. Histories are full
    /// windows up to "now"; implementations keep whatever state they need.
    fn on_data(&mut self, symbol: &str, bars: &[PricePoint]);

    /// Produce signals for the data seen so far
    fn generate_signals(&mut self) -> Vec<StrategySignal>;
}

/// Configuration-selectable strategy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    VolBreakout,
    SmaCrossover,
    BuyAndHold,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::VolBreakout => write!(f, "vol_breakout"),
            StrategyKind::SmaCrossover => write!(f, "sma_crossover"),
            StrategyKind::BuyAndHold => write!(f, "buy_and_hold"),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vol_breakout" => Ok(StrategyKind::VolBreakout),
            "sma_crossover" => Ok(StrategyKind::SmaCrossover),
            "buy_and_hold" => Ok(StrategyKind::BuyAndHold),
            other => Err(format!("unknown strategy: {}", other)),
        }
    }
}

/// Build a strategy instance for one symbol
pub fn build_strategy(
    kind: StrategyKind,
    symbol: &str,
    detector: DetectorConfig,
    crossover: CrossoverConfig,
) -> Box<dyn Strategy> {
    use crate::strategy::buy_and_hold::BuyAndHoldStrategy;
    use crate::strategy::sma_crossover::SmaCrossoverStrategy;
    use crate::strategy::volatility::VolatilityBreakoutStrategy;

    match kind {
        StrategyKind::VolBreakout => Box::new(VolatilityBreakoutStrategy::new(symbol, detector)),
        StrategyKind::SmaCrossover => Box::new(SmaCrossoverStrategy::new(symbol, crossover)),
        StrategyKind::BuyAndHold => Box::new(BuyAndHoldStrategy::new(symbol, 10)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            StrategyKind::VolBreakout,
            StrategyKind::SmaCrossover,
            StrategyKind::BuyAndHold,
        ] {
            let parsed: StrategyKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!("martingale".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_factory_builds_each_kind() {
        for kind in [
            StrategyKind::VolBreakout,
            StrategyKind::SmaCrossover,
            StrategyKind::BuyAndHold,
        ] {
            let strategy = build_strategy(
                kind,
                "TEST",
                DetectorConfig::default(),
                CrossoverConfig::default(),
            );
            assert!(!strategy.name().is_empty());
        }
    }
}
