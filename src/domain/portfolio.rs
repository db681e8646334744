//! Portfolio Bookkeeping
//!
//! Cash and share positions for the close-price simulator. Long-only:
//! sells are rejected beyond the held quantity.

use std::collections::HashMap;

/// Cash plus per-symbol share counts
#[derive(Debug, Clone)]
pub struct Portfolio {
    cash: f64,
    positions: HashMap<String, u32>,
    initial_capital: f64,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            positions: HashMap::new(),
            initial_capital,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self, symbol: &str) -> u32 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    /// Buy shares at a price. Returns false without mutating state when
    /// cash is insufficient.
    pub fn buy(&mut self, symbol: &str, quantity: u32, price: f64) -> bool {
        let cost = quantity as f64 * price;
        if cost > self.cash {
            return false;
        }
        self.cash -= cost;
        *self.positions.entry(symbol.to_string()).or_insert(0) += quantity;
        true
    }

    /// Sell held shares at a price. Returns false when the position is
    /// smaller than the requested quantity.
    pub fn sell(&mut self, symbol: &str, quantity: u32, price: f64) -> bool {
        let held = self.position(symbol);
        if held < quantity {
            return false;
        }
        self.cash += quantity as f64 * price;
        let remaining = held - quantity;
        if remaining == 0 {
            self.positions.remove(symbol);
        } else {
            self.positions.insert(symbol.to_string(), remaining);
        }
        true
    }

    /// Mark-to-market equity given current prices. Symbols without a
    /// quote are valued at zero.
    pub fn total_value(&self, prices: &HashMap<String, f64>) -> f64 {
        let holdings: f64 = self
            .positions
            .iter()
            .map(|(symbol, &qty)| prices.get(symbol).copied().unwrap_or(0.0) * qty as f64)
            .sum();
        self.cash + holdings
    }

    pub fn pnl(&self, prices: &HashMap<String, f64>) -> f64 {
        self.total_value(prices) - self.initial_capital
    }

    pub fn open_positions(&self) -> &HashMap<String, u32> {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_buy_reduces_cash() {
        let mut p = Portfolio::new(10_000.0);
        assert!(p.buy("AAPL", 10, 150.0));
        assert_relative_eq!(p.cash(), 8_500.0, epsilon = 1e-9);
        assert_eq!(p.position("AAPL"), 10);
    }

    #[test]
    fn test_buy_rejected_when_unaffordable() {
        let mut p = Portfolio::new(1_000.0);
        assert!(!p.buy("AAPL", 10, 150.0));
        assert_relative_eq!(p.cash(), 1_000.0, epsilon = 1e-9);
        assert_eq!(p.position("AAPL"), 0);
    }

    #[test]
    fn test_sell_roundtrip() {
        let mut p = Portfolio::new(10_000.0);
        p.buy("AAPL", 10, 150.0);
        assert!(p.sell("AAPL", 10, 160.0));
        assert_relative_eq!(p.cash(), 10_100.0, epsilon = 1e-9);
        assert_eq!(p.position("AAPL"), 0);
    }

    #[test]
    fn test_oversell_rejected() {
        let mut p = Portfolio::new(10_000.0);
        p.buy("AAPL", 5, 100.0);
        assert!(!p.sell("AAPL", 6, 100.0));
        assert_eq!(p.position("AAPL"), 5);
    }

    #[test]
    fn test_total_value_and_pnl() {
        let mut p = Portfolio::new(10_000.0);
        p.buy("AAPL", 10, 100.0);
        let mut prices = HashMap::new();
        prices.insert("AAPL".to_string(), 110.0);
        assert_relative_eq!(p.total_value(&prices), 10_100.0, epsilon = 1e-9);
        assert_relative_eq!(p.pnl(&prices), 100.0, epsilon = 1e-9);
    }
}
