//! Strategy Parameters
//!
//! Configuration structs for signal detection and position sizing.
//! Defaults mirror the research heuristics this toolkit grew out of
//! (20-day lookback, 1.5 sigma trigger, 40% win rate at 3:1 payoff,
//! half Kelly, 5% max risk) and are not statistically calibrated;
//! treat them as starting points, not truths.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Volatility detector configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Number of trailing returns in the rolling window
    pub lookback: usize,
    /// Z-score magnitude that flags a breakout
    pub z_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            z_threshold: 1.5,
        }
    }
}

impl DetectorConfig {
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn with_z_threshold(mut self, threshold: f64) -> Self {
        self.z_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.lookback < 2 {
            return Err(ParamsError::InvalidLookback(self.lookback));
        }
        if self.z_threshold <= 0.0 || self.z_threshold > 10.0 {
            return Err(ParamsError::InvalidZThreshold(self.z_threshold));
        }
        Ok(())
    }
}

/// Kelly sizing assumptions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Estimated strategy win rate
    pub win_rate: f64,
    /// Estimated win/loss payoff ratio
    pub win_loss_ratio: f64,
    /// Fraction of full Kelly to apply
    pub kelly_fraction: f64,
    /// Hard cap on capital at risk per trade
    pub max_risk_per_trade: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            win_rate: 0.40,
            win_loss_ratio: 3.0,
            kelly_fraction: 0.5,
            max_risk_per_trade: 0.05,
        }
    }
}

impl SizingConfig {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(0.0..=1.0).contains(&self.win_rate) {
            return Err(ParamsError::InvalidWinRate(self.win_rate));
        }
        if !(0.0..=1.0).contains(&self.kelly_fraction) {
            return Err(ParamsError::InvalidKellyFraction(self.kelly_fraction));
        }
        if self.max_risk_per_trade <= 0.0 || self.max_risk_per_trade > 1.0 {
            return Err(ParamsError::InvalidMaxRisk(self.max_risk_per_trade));
        }
        Ok(())
    }
}

/// Moving-average crossover configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CrossoverConfig {
    pub short_window: usize,
    pub long_window: usize,
    /// Fixed share count per crossover signal
    pub trade_quantity: u32,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
            trade_quantity: 10,
        }
    }
}

impl CrossoverConfig {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.short_window == 0 || self.short_window >= self.long_window {
            return Err(ParamsError::InvalidWindows {
                short: self.short_window,
                long: self.long_window,
            });
        }
        Ok(())
    }
}

/// Parameter validation errors
#[derive(Debug, Clone, Error)]
pub enum ParamsError {
    #[error("Invalid lookback: {0} (minimum 2)")]
    InvalidLookback(usize),
    #[error("Invalid z-threshold: {0} (must be 0 < z <= 10)")]
    InvalidZThreshold(f64),
    #[error("Invalid win rate: {0} (must be 0-1)")]
    InvalidWinRate(f64),
    #[error("Invalid Kelly fraction: {0} (must be 0-1)")]
    InvalidKellyFraction(f64),
    #[error("Invalid max risk per trade: {0} (must be 0 < r <= 1)")]
    InvalidMaxRisk(f64),
    #[error("Invalid SMA windows: short {short} must be < long {long}")]
    InvalidWindows { short: usize, long: usize },
}
