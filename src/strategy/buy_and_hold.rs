//! Buy and Hold
//!
//! Buys once, then stays quiet. Mostly a baseline for the simulator.

use crate::domain::returns::PricePoint;
use crate::domain::signal::TradeAction;
use crate::strategy::traits::{Sizing, Strategy, StrategySignal};

pub struct BuyAndHoldStrategy {
    symbol: String,
    quantity: u32,
    bought: bool,
    has_data: bool,
}

impl BuyAndHoldStrategy {
    pub fn new(symbol: &str, quantity: u32) -> Self {
        Self {
            symbol: symbol.to_string(),
            quantity,
            bought: false,
            has_data: false,
        }
    }
}

impl Strategy for BuyAndHoldStrategy {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn on_data(&mut self, symbol: &str, bars: &[PricePoint]) {
        if symbol == self.symbol && !bars.is_empty() {
            self.has_data = true;
        }
    }

    fn generate_signals(&mut self) -> Vec<StrategySignal> {
        if self.bought || !self.has_data {
            return Vec::new();
        }
        self.bought = true;
        vec![StrategySignal {
            symbol: self.symbol.clone(),
            action: TradeAction::Buy,
            sizing: Sizing::Shares(self.quantity),
            strategy_tag: self.name().to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(close: f64) -> PricePoint {
        PricePoint {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    #[test]
    fn test_buys_exactly_once() {
        let mut s = BuyAndHoldStrategy::new("SPY", 10);
        s.on_data("SPY", &[bar(500.0)]);

        let first = s.generate_signals();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].action, TradeAction::Buy);

        s.on_data("SPY", &[bar(501.0)]);
        assert!(s.generate_signals().is_empty());
    }

    #[test]
    fn test_waits_for_data() {
        let mut s = BuyAndHoldStrategy::new("SPY", 10);
        assert!(s.generate_signals().is_empty());
    }
}
