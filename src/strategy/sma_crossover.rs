//! SMA Crossover Strategy
//!
//! Golden cross buys, death cross sells. Long-only with a fixed share
//! count per signal.

use crate::domain::returns::PricePoint;
use crate::domain::signal::TradeAction;
use crate::strategy::params::CrossoverConfig;
use crate::strategy::traits::{Sizing, Strategy, StrategySignal};

pub struct SmaCrossoverStrategy {
    symbol: String,
    config: CrossoverConfig,
    bars: Vec<PricePoint>,
    in_position: bool,
}

impl SmaCrossoverStrategy {
    pub fn new(symbol: &str, config: CrossoverConfig) -> Self {
        Self {
            symbol: symbol.to_string(),
            config,
            bars: Vec::new(),
            in_position: false,
        }
    }

    /// Simple moving average of the `window` closes ending at `end`
    /// (exclusive). `None` if fewer closes exist.
    fn sma(&self, window: usize, end: usize) -> Option<f64> {
        if end < window {
            return None;
        }
        let slice = &self.bars[end - window..end];
        Some(slice.iter().map(|b| b.close).sum::<f64>() / window as f64)
    }
}

impl Strategy for SmaCrossoverStrategy {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn on_data(&mut self, symbol: &str, bars: &[PricePoint]) {
        if symbol == self.symbol {
            self.bars = bars.to_vec();
        }
    }

    fn generate_signals(&mut self) -> Vec<StrategySignal> {
        let n = self.bars.len();
        // Need the long window plus one prior bar for the cross check
        if n < self.config.long_window + 1 {
            return Vec::new();
        }

        let short_now = match self.sma(self.config.short_window, n) {
            Some(v) => v,
            None => return Vec::new(),
        };
        let long_now = match self.sma(self.config.long_window, n) {
            Some(v) => v,
            None => return Vec::new(),
        };
        let short_prev = match self.sma(self.config.short_window, n - 1) {
            Some(v) => v,
            None => return Vec::new(),
        };
        let long_prev = match self.sma(self.config.long_window, n - 1) {
            Some(v) => v,
            None => return Vec::new(),
        };

        let mut signals = Vec::new();

        if short_prev <= long_prev && short_now > long_now && !self.in_position {
            self.in_position = true;
            signals.push(StrategySignal {
                symbol: self.symbol.clone(),
                action: TradeAction::Buy,
                sizing: Sizing::Shares(self.config.trade_quantity),
                strategy_tag: self.name().to_string(),
            });
        } else if short_prev >= long_prev && short_now < long_now && self.in_position {
            self.in_position = false;
            signals.push(StrategySignal {
                symbol: self.symbol.clone(),
                action: TradeAction::Sell,
                sizing: Sizing::Shares(self.config.trade_quantity),
                strategy_tag: self.name().to_string(),
            });
        }

        signals
    }
}
