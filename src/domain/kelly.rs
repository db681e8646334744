//! Kelly Position Sizing
//!
//! Converts win-rate/payoff assumptions into a dollar allocation,
//! hard-capped by a maximum risk-per-trade constraint. Fractional
//! Kelly is used throughout; full Kelly is too volatile to run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sizing errors indicate caller bugs, not transient data conditions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    #[error("stop_loss_pct must be > 0, got {0}")]
    InvalidStopLoss(f64),
    #[error("capital must be >= 0, got {0}")]
    NegativeCapital(f64),
}

/// Outcome of a sizing calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationDecision {
    pub capital: f64,
    /// Fractional Kelly percentage actually applied
    pub kelly_pct: f64,
    pub stop_loss_pct: f64,
    /// min(kelly dollars, risk-capped dollars), never negative
    pub dollar_allocation: f64,
}

/// Kelly criterion position sizer with a risk ceiling
#[derive(Debug, Clone)]
pub struct KellySizer {
    /// Maximum fraction of capital at risk on one trade (stop-loss amount)
    max_risk_per_trade: f64,
    /// Fraction of full Kelly to apply (0.5 = half Kelly)
    kelly_fraction: f64,
}

impl KellySizer {
    pub fn new(max_risk_per_trade: f64, kelly_fraction: f64) -> Self {
        Self {
            max_risk_per_trade,
            kelly_fraction,
        }
    }

    /// Fractional Kelly percentage: `max(0, W - (1-W)/R) * fraction`.
    ///
    /// A non-positive win/loss ratio signals no edge and sizes to zero.
    pub fn kelly_pct(&self, win_rate: f64, win_loss_ratio: f64) -> f64 {
        if win_loss_ratio <= 0.0 {
            return 0.0;
        }
        let full_kelly = win_rate - (1.0 - win_rate) / win_loss_ratio;
        full_kelly.max(0.0) * self.kelly_fraction
    }

    /// Target dollar allocation for one trade.
    ///
    /// The Kelly dollars are capped so that
    /// `allocation * stop_loss_pct <= capital * max_risk_per_trade`
    /// holds regardless of how aggressive the Kelly output is.
    pub fn size(
        &self,
        capital: f64,
        stop_loss_pct: f64,
        win_rate: f64,
        win_loss_ratio: f64,
    ) -> Result<AllocationDecision, SizingError> {
        if capital < 0.0 {
            return Err(SizingError::NegativeCapital(capital));
        }
        if stop_loss_pct <= 0.0 {
            return Err(SizingError::InvalidStopLoss(stop_loss_pct));
        }

        let kelly_pct = self.kelly_pct(win_rate, win_loss_ratio);
        let kelly_dollar = capital * kelly_pct;
        let risk_capped_dollar = capital * self.max_risk_per_trade / stop_loss_pct;
        let dollar_allocation = kelly_dollar.min(risk_capped_dollar).max(0.0);

        Ok(AllocationDecision {
            capital,
            kelly_pct,
            stop_loss_pct,
            dollar_allocation,
        })
    }
}

impl Default for KellySizer {
    /// Half Kelly with 5% max risk per trade
    fn default() -> Self {
        Self::new(0.05, 0.5)
    }
}
