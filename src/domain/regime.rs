//! Market Regime Classification
//!
//! Combines volatility-index level and broad-market trend into a coarse
//! regime label, and maps each regime to long/short Kelly multipliers.
//! Classification is stateless: identical inputs always produce the
//! same state, and no history is kept between calls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification thresholds; uncalibrated heuristics, so kept
/// configurable rather than baked into the decision logic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeThresholds {
    /// Volatility index level above which everything is Volatile
    pub vix_high: f64,
    /// Lower bound of the caution band
    pub vix_elevated: f64,
    /// Trend return below which the caution band turns Bearish
    pub bearish_trend: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            vix_high: 25.0,
            vix_elevated: 18.0,
            bearish_trend: -0.01,
        }
    }
}

/// Coarse market-condition label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegimeState {
    Bullish,
    Bearish,
    Volatile,
    Neutral,
}

impl fmt::Display for RegimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegimeState::Bullish => write!(f, "BULLISH"),
            RegimeState::Bearish => write!(f, "BEARISH"),
            RegimeState::Volatile => write!(f, "VOLATILE"),
            RegimeState::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Kelly fraction multipliers for each trade direction, both in [0, 1]
///
/// Both zero means the regime forbids trading entirely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KellyMultipliers {
    pub long: f64,
    pub short: f64,
}

impl KellyMultipliers {
    /// True when neither direction is allowed any size
    pub fn is_blocked(&self) -> bool {
        self.long == 0.0 && self.short == 0.0
    }

    /// Multiplier for a given direction (long = buy side)
    pub fn for_long(&self, long: bool) -> f64 {
        if long {
            self.long
        } else {
            self.short
        }
    }
}

/// Inputs to a regime evaluation
///
/// When the upstream macro source is unavailable the caller passes
/// `RegimeInputs::default()` (vix 20, flat trend, flat breadth) rather
/// than failing the scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeInputs {
    /// Volatility index level (e.g. VIX close)
    pub vix_level: f64,
    /// Recent broad-market return, e.g. 5-day SPY return
    pub market_trend_return: f64,
    /// Small-cap minus large-cap return; recorded but not yet a
    /// classification input
    pub breadth_diff: f64,
}

impl Default for RegimeInputs {
    fn default() -> Self {
        Self {
            vix_level: 20.0,
            market_trend_return: 0.0,
            breadth_diff: 0.0,
        }
    }
}

/// Stateless regime classifier with configurable thresholds
#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    thresholds: RegimeThresholds,
}

impl RegimeClassifier {
    pub fn new(thresholds: RegimeThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify the current regime from macro inputs.
    ///
    /// Decision order: a high volatility index dominates everything;
    /// in the caution band the trend decides bearish vs neutral; below
    /// it a rising market is bullish, anything else neutral.
    pub fn classify(&self, inputs: &RegimeInputs) -> RegimeState {
        let t = &self.thresholds;
        if inputs.vix_level > t.vix_high {
            RegimeState::Volatile
        } else if inputs.vix_level > t.vix_elevated {
            if inputs.market_trend_return < t.bearish_trend {
                RegimeState::Bearish
            } else {
                RegimeState::Neutral
            }
        } else if inputs.market_trend_return > 0.0 {
            RegimeState::Bullish
        } else {
            RegimeState::Neutral
        }
    }

    /// Fixed multiplier policy per regime
    pub fn multipliers(&self, state: RegimeState) -> KellyMultipliers {
        match state {
            // Buy dips, don't short
            RegimeState::Bullish => KellyMultipliers { long: 1.0, short: 0.0 },
            // Choppy, trade both sides smaller
            RegimeState::Neutral => KellyMultipliers { long: 0.5, short: 0.5 },
            // High risk, minimal size either way
            RegimeState::Volatile => KellyMultipliers { long: 0.25, short: 0.25 },
            // Puts/shorts only
            RegimeState::Bearish => KellyMultipliers { long: 0.0, short: 1.0 },
        }
    }
}

impl Default for RegimeClassifier {
    fn default() -> Self {
        Self::new(RegimeThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RegimeClassifier {
        RegimeClassifier::default()
    }

    fn inputs(vix: f64, trend: f64) -> RegimeInputs {
        RegimeInputs {
            vix_level: vix,
            market_trend_return: trend,
            breadth_diff: 0.0,
        }
    }

    #[test]
    fn test_high_vix_is_volatile_regardless_of_trend() {
        let c = classifier();
        assert_eq!(c.classify(&inputs(30.0, -0.02)), RegimeState::Volatile);
        assert_eq!(c.classify(&inputs(30.0, 0.05)), RegimeState::Volatile);
        assert_eq!(c.classify(&inputs(25.1, 0.0)), RegimeState::Volatile);
    }

    #[test]
    fn test_elevated_vix_falling_market_is_bearish() {
        let c = classifier();
        assert_eq!(c.classify(&inputs(20.0, -0.02)), RegimeState::Bearish);
        assert_eq!(c.classify(&inputs(24.0, -0.011)), RegimeState::Bearish);
    }

    #[test]
    fn test_elevated_vix_holding_market_is_neutral() {
        let c = classifier();
        assert_eq!(c.classify(&inputs(20.0, 0.0)), RegimeState::Neutral);
        assert_eq!(c.classify(&inputs(20.0, -0.01)), RegimeState::Neutral);
        assert_eq!(c.classify(&inputs(20.0, 0.02)), RegimeState::Neutral);
    }

    #[test]
    fn test_low_vix_rising_market_is_bullish() {
        let c = classifier();
        assert_eq!(c.classify(&inputs(14.0, 0.005)), RegimeState::Bullish);
    }

    #[test]
    fn test_low_vix_flat_market_is_neutral() {
        let c = classifier();
        assert_eq!(c.classify(&inputs(14.0, 0.0)), RegimeState::Neutral);
        assert_eq!(c.classify(&inputs(14.0, -0.01)), RegimeState::Neutral);
    }

    #[test]
    fn test_classification_is_pure() {
        let c = classifier();
        let i = inputs(22.0, -0.015);
        let first = c.classify(&i);
        for _ in 0..10 {
            assert_eq!(c.classify(&i), first);
        }
    }

    #[test]
    fn test_multiplier_table() {
        let c = classifier();
        let bull = c.multipliers(RegimeState::Bullish);
        assert_eq!(bull, KellyMultipliers { long: 1.0, short: 0.0 });

        let neutral = c.multipliers(RegimeState::Neutral);
        assert_eq!(neutral, KellyMultipliers { long: 0.5, short: 0.5 });

        let volatile = c.multipliers(RegimeState::Volatile);
        assert_eq!(volatile, KellyMultipliers { long: 0.25, short: 0.25 });

        let bear = c.multipliers(RegimeState::Bearish);
        assert_eq!(bear, KellyMultipliers { long: 0.0, short: 1.0 });
    }

    #[test]
    fn test_bullish_never_shorts_bearish_never_longs() {
        let c = classifier();
        assert_eq!(c.multipliers(RegimeState::Bullish).short, 0.0);
        assert_eq!(c.multipliers(RegimeState::Bearish).long, 0.0);
    }

    #[test]
    fn test_default_inputs_are_neutral() {
        let c = classifier();
        let state = c.classify(&RegimeInputs::default());
        assert_eq!(state, RegimeState::Neutral);
    }

    #[test]
    fn test_scenario_volatile_multipliers() {
        // vix=30, trend=-2% -> VOLATILE with quarter-size both ways
        let c = classifier();
        let state = c.classify(&inputs(30.0, -0.02));
        assert_eq!(state, RegimeState::Volatile);
        let m = c.multipliers(state);
        assert_eq!(m.long, 0.25);
        assert_eq!(m.short, 0.25);
        assert!(!m.is_blocked());
    }
}
