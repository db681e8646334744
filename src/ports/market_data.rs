//! Market Data Port
//!
//! Trait abstraction over historical price providers. Implementations
//! are not assumed safe for unbounded concurrent use; the scan pipeline
//! bounds and optionally serializes calls to this port.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::returns::PricePoint;

/// Market data error type
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// The symbol or range yielded no data, or the upstream fetch failed
    #[error("No data available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),
}

impl MarketDataError {
    pub fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

/// Bar interval for historical queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Daily,
    Hourly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Hourly => "1h",
        }
    }
}

/// Historical data query parameters
#[derive(Debug, Clone)]
pub struct HistoricalQuery {
    pub symbol: String,
    pub start: NaiveDate,
    /// Defaults to the provider's latest session when `None`
    pub end: Option<NaiveDate>,
    pub interval: Interval,
}

impl HistoricalQuery {
    pub fn daily(symbol: &str, start: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_string(),
            start,
            end: None,
            interval: Interval::Daily,
        }
    }
}

/// Historical price provider
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Fetch chronological bars for a symbol.
    /// Fails with `DataUnavailable` when the symbol or range yields nothing.
    async fn get_history(&self, query: &HistoricalQuery)
        -> Result<Vec<PricePoint>, MarketDataError>;

    /// Latest trade price for a symbol
    async fn get_latest_price(&self, symbol: &str) -> Result<f64, MarketDataError>;
}
