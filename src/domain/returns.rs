//! Price History and Returns
//!
//! OHLCV bars and the derived close-to-close return series that
//! feeds the volatility detector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Close-to-close percentage returns derived from a bar sequence
///
/// Element i is `(close[i+1] - close[i]) / close[i]` over the source bars,
/// so a history of N bars yields N-1 returns.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    returns: Vec<f64>,
}

impl ReturnSeries {
    /// Build from chronological bars. Bars with a non-positive close are
    /// skipped along with the return that would divide by them.
    pub fn from_bars(bars: &[PricePoint]) -> Self {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        Self::from_closes(&closes)
    }

    /// Build directly from a close-price sequence
    pub fn from_closes(closes: &[f64]) -> Self {
        let returns = closes
            .windows(2)
            .filter(|w| w[0] > 0.0)
            .map(|w| (w[1] - w[0]) / w[0])
            .collect();
        Self { returns }
    }

    /// Wrap an already-computed return sequence
    pub fn from_returns(returns: Vec<f64>) -> Self {
        Self { returns }
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Most recent return, if any
    pub fn latest(&self) -> Option<f64> {
        self.returns.last().copied()
    }

    /// The trailing `window` returns immediately before the latest one.
    /// Returns `None` unless the series holds at least `window + 1` values.
    pub fn trailing_window(&self, window: usize) -> Option<&[f64]> {
        if window == 0 || self.returns.len() < window + 1 {
            return None;
        }
        let end = self.returns.len() - 1;
        Some(&self.returns[end - window..end])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.returns
    }
}

/// Mean of a return window
pub fn rolling_mean(window: &[f64]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

/// Population standard deviation of a return window
pub fn rolling_std(window: &[f64], mean: f64) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let variance = window
        .iter()
        .map(|&r| {
            let diff = r - mean;
            diff * diff
        })
        .sum::<f64>()
        / window.len() as f64;
    variance.sqrt()
}
