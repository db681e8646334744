//! Trading Signals
//!
//! Typed signal values produced by the detection pipeline: the raw
//! volatility reading and the finished, memo-ready trade signal.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::contract::OptionContract;

/// Direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

/// Result of a single volatility evaluation
///
/// Created fresh per evaluation; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilitySignal {
    pub symbol: String,
    /// Z-score of the latest return against the trailing window
    pub z_score: f64,
    pub rolling_std: f64,
    pub rolling_mean: f64,
    pub current_return: f64,
    /// Whether |z| cleared the breakout threshold
    pub is_breakout: bool,
}

impl VolatilitySignal {
    /// Directional bet implied by the move: up-breakout buys, down-breakout sells
    pub fn action(&self) -> TradeAction {
        if self.z_score > 0.0 {
            TradeAction::Buy
        } else {
            TradeAction::Sell
        }
    }

    /// Confidence from the standard normal CDF of the z-score magnitude
    pub fn confidence(&self) -> f64 {
        use statrs::function::erf::erf;
        // Φ(|z|) = 0.5 * (1 + erf(|z| / sqrt(2)))
        0.5 * (1.0 + erf(self.z_score.abs() / f64::sqrt(2.0)))
    }
}

/// Finished trade signal, ready for the memo sink
///
/// All fields are required at construction; there is no partially
/// populated state.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeSignal {
    pub symbol: String,
    pub action: TradeAction,
    /// Dollar allocation after regime adjustment
    pub allocation: f64,
    pub selected_contract: OptionContract,
    /// Number of contracts, `floor(allocation / (last_price * 100))`
    pub quantity: u32,
    /// Name of the strategy that produced the signal
    pub strategy_tag: String,
}

impl TradeSignal {
    /// Total premium outlay for the position
    pub fn total_cost(&self) -> f64 {
        self.quantity as f64 * self.selected_contract.cost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::{OptionContract, OptionType};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn test_signal(z: f64) -> VolatilitySignal {
        VolatilitySignal {
            symbol: "NVDA".to_string(),
            z_score: z,
            rolling_std: 0.02,
            rolling_mean: 0.001,
            current_return: 0.05,
            is_breakout: z.abs() > 1.5,
        }
    }

    fn test_contract() -> OptionContract {
        OptionContract {
            symbol: "NVDA250117C00150000".to_string(),
            strike: 150.0,
            expiry: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
            last_price: 3.0,
            contract_type: OptionType::Call,
            open_interest: 1200,
            volume: 450,
        }
    }

    #[test]
    fn test_action_follows_z_sign() {
        assert_eq!(test_signal(2.0).action(), TradeAction::Buy);
        assert_eq!(test_signal(-2.0).action(), TradeAction::Sell);
    }

    #[test]
    fn test_confidence_from_normal_cdf() {
        assert_relative_eq!(test_signal(0.0).confidence(), 0.5, epsilon = 0.001);
        assert_relative_eq!(test_signal(2.0).confidence(), 0.977, epsilon = 0.001);
        // Symmetric in the sign of z
        assert_relative_eq!(
            test_signal(-2.0).confidence(),
            test_signal(2.0).confidence(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_trade_signal_total_cost() {
        let signal = TradeSignal {
            symbol: "NVDA".to_string(),
            action: TradeAction::Buy,
            allocation: 1000.0,
            selected_contract: test_contract(),
            quantity: 3,
            strategy_tag: "vol_breakout".to_string(),
        };
        assert_relative_eq!(signal.total_cost(), 900.0, epsilon = 1e-9);
        assert!(signal.total_cost() <= signal.allocation);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(TradeAction::Buy.to_string(), "BUY");
        assert_eq!(TradeAction::Sell.to_string(), "SELL");
    }
}
