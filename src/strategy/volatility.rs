//! Volatility Breakout Detection
//!
//! Z-scores the latest return against a trailing window and flags
//! moves whose magnitude clears the configured threshold. The rolling
//! statistics exclude the return being tested so the move cannot
//! dampen its own baseline.

use crate::domain::kelly::KellySizer;
use crate::domain::returns::{rolling_mean, rolling_std, PricePoint, ReturnSeries};
use crate::domain::signal::{TradeAction, VolatilitySignal};
use crate::strategy::params::{DetectorConfig, SizingConfig};
use crate::strategy::traits::{Sizing, Strategy, StrategySignal};

/// Minimum standard deviation treated as nonzero
const MIN_STD: f64 = 1e-10;

/// Pure z-score breakout detector
#[derive(Debug, Clone)]
pub struct VolatilityDetector {
    config: DetectorConfig,
}

impl VolatilityDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Evaluate the latest return in the series.
    ///
    /// `None` is a control-flow outcome, not an error: the series is too
    /// short for the lookback, or the window has zero variance and a
    /// z-score would be undefined.
    pub fn detect(&self, symbol: &str, returns: &ReturnSeries) -> Option<VolatilitySignal> {
        let window = returns.trailing_window(self.config.lookback)?;
        let current_return = returns.latest()?;

        let mean = rolling_mean(window);
        let std = rolling_std(window, mean);
        if std < MIN_STD {
            return None;
        }

        let z_score = (current_return - mean) / std;

        Some(VolatilitySignal {
            symbol: symbol.to_string(),
            z_score,
            rolling_std: std,
            rolling_mean: mean,
            current_return,
            is_breakout: z_score.abs() > self.config.z_threshold,
        })
    }
}

impl Default for VolatilityDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

/// Breakout strategy for the close-price simulator: detects, then
/// sizes the bet with risk-capped Kelly at a stop of twice the daily
/// rolling std.
pub struct VolatilityBreakoutStrategy {
    symbol: String,
    detector: VolatilityDetector,
    sizer: KellySizer,
    sizing: SizingConfig,
    capital: f64,
    bars: Vec<PricePoint>,
    /// -1 short, 0 flat, 1 long
    position: i8,
}

impl VolatilityBreakoutStrategy {
    pub fn new(symbol: &str, config: DetectorConfig) -> Self {
        Self::with_sizing(symbol, config, SizingConfig::default(), 10_000.0)
    }

    pub fn with_sizing(
        symbol: &str,
        config: DetectorConfig,
        sizing: SizingConfig,
        capital: f64,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            detector: VolatilityDetector::new(config),
            sizer: KellySizer::new(sizing.max_risk_per_trade, sizing.kelly_fraction),
            sizing,
            capital,
            bars: Vec::new(),
            position: 0,
        }
    }
}

impl Strategy for VolatilityBreakoutStrategy {
    fn name(&self) -> &str {
        "vol_breakout"
    }

    fn on_data(&mut self, symbol: &str, bars: &[PricePoint]) {
        if symbol == self.symbol {
            self.bars = bars.to_vec();
        }
    }

    fn generate_signals(&mut self) -> Vec<StrategySignal> {
        let returns = ReturnSeries::from_bars(&self.bars);
        let signal = match self.detector.detect(&self.symbol, &returns) {
            Some(s) if s.is_breakout => s,
            _ => return Vec::new(),
        };

        let action = signal.action();
        let stop_loss_pct = 2.0 * signal.rolling_std;
        let allocation = match self.sizer.size(
            self.capital,
            stop_loss_pct,
            self.sizing.win_rate,
            self.sizing.win_loss_ratio,
        ) {
            Ok(decision) if decision.dollar_allocation > 0.0 => decision.dollar_allocation,
            _ => return Vec::new(),
        };

        let desired = if action == TradeAction::Buy { 1 } else { -1 };
        if self.position == desired {
            return Vec::new();
        }
        self.position = desired;

        vec![StrategySignal {
            symbol: self.symbol.clone(),
            action,
            sizing: Sizing::Dollars(allocation),
            strategy_tag: self.name().to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn detector(lookback: usize, threshold: f64) -> VolatilityDetector {
        VolatilityDetector::new(DetectorConfig {
            lookback,
            z_threshold: threshold,
        })
    }

    /// 20 alternating +/-1% returns: mean 0, population std exactly 0.01
    fn alternating_window() -> Vec<f64> {
        (0..20)
            .map(|i| if i % 2 == 0 { 0.01 } else { -0.01 })
            .collect()
    }

    #[test]
    fn test_five_sigma_move_is_breakout_buy() {
        let mut returns = alternating_window();
        returns.push(0.05);
        let series = ReturnSeries::from_returns(returns);

        let signal = detector(20, 1.5).detect("NVDA", &series).unwrap();
        assert_relative_eq!(signal.rolling_mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(signal.rolling_std, 0.01, epsilon = 1e-12);
        assert_relative_eq!(signal.z_score, 5.0, epsilon = 1e-9);
        assert!(signal.is_breakout);
        assert_eq!(signal.action(), TradeAction::Buy);
    }

    #[test]
    fn test_downside_breakout_sells() {
        let mut returns = alternating_window();
        returns.push(-0.05);
        let series = ReturnSeries::from_returns(returns);

        let signal = detector(20, 1.5).detect("NVDA", &series).unwrap();
        assert_relative_eq!(signal.z_score, -5.0, epsilon = 1e-9);
        assert!(signal.is_breakout);
        assert_eq!(signal.action(), TradeAction::Sell);
    }

    #[test]
    fn test_insufficient_data_returns_none() {
        let series = ReturnSeries::from_returns(vec![0.01; 20]);
        // 20 returns: window of 20 plus the tested value needs 21
        assert!(detector(20, 1.5).detect("NVDA", &series).is_none());
    }

    #[test]
    fn test_zero_variance_returns_none() {
        let mut returns = vec![0.0; 20];
        returns.push(0.05);
        let series = ReturnSeries::from_returns(returns);
        // Flat window has zero std; never divides by zero, never flags
        assert!(detector(20, 1.5).detect("NVDA", &series).is_none());
    }

    #[test]
    fn test_small_move_is_not_breakout() {
        let mut returns = alternating_window();
        returns.push(0.012);
        let series = ReturnSeries::from_returns(returns);

        let signal = detector(20, 1.5).detect("NVDA", &series).unwrap();
        assert_relative_eq!(signal.z_score, 1.2, epsilon = 1e-9);
        assert!(!signal.is_breakout);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let mut returns = alternating_window();
        returns.push(0.03);
        let series = ReturnSeries::from_returns(returns);
        let d = detector(20, 1.5);

        let first = d.detect("NVDA", &series).unwrap();
        for _ in 0..5 {
            assert_eq!(d.detect("NVDA", &series).unwrap(), first);
        }
    }

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

    /// Closes whose returns alternate +/-1% then jump 5%
    fn breakout_closes() -> Vec<f64> {
        let mut closes = vec![100.0];
        for i in 0..20 {
            let r = if i % 2 == 0 { 0.01 } else { -0.01 };
            let last = *closes.last().unwrap();
            closes.push(last * (1.0 + r));
        }
        let last = *closes.last().unwrap();
        closes.push(last * 1.05);
        closes
    }

    #[test]
    fn test_breakout_strategy_emits_dollar_signal() {
        let mut strategy = VolatilityBreakoutStrategy::new("NVDA", DetectorConfig::default());
        let bars: Vec<PricePoint> = breakout_closes().iter().map(|&c| bar(c)).collect();

        strategy.on_data("NVDA", &bars);
        let signals = strategy.generate_signals();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].action, TradeAction::Buy);
        match signals[0].sizing {
            Sizing::Dollars(d) => assert!(d > 0.0),
            _ => panic!("expected dollar sizing"),
        }
    }

    #[test]
    fn test_breakout_strategy_does_not_repeat_position() {
        let mut strategy = VolatilityBreakoutStrategy::new("NVDA", DetectorConfig::default());
        let bars: Vec<PricePoint> = breakout_closes().iter().map(|&c| bar(c)).collect();

        strategy.on_data("NVDA", &bars);
        assert_eq!(strategy.generate_signals().len(), 1);
        // Same data again: already long, no re-entry
        strategy.on_data("NVDA", &bars);
        assert!(strategy.generate_signals().is_empty());
    }

    #[test]
    fn test_breakout_strategy_ignores_other_symbols() {
        let mut strategy = VolatilityBreakoutStrategy::new("NVDA", DetectorConfig::default());
        let bars: Vec<PricePoint> = breakout_closes().iter().map(|&c| bar(c)).collect();

        strategy.on_data("TSLA", &bars);
        assert!(strategy.generate_signals().is_empty());
    }
}
