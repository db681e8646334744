//! Options Data Port
//!
//! Trait abstraction over options-chain providers.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::contract::OptionContract;

/// Options data error type
#[derive(Debug, Error)]
pub enum OptionsDataError {
    #[error("No options data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),
}

impl OptionsDataError {
    pub fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

/// Both sides of a chain for one (symbol, expiry)
#[derive(Debug, Clone, Default)]
pub struct OptionChain {
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

/// Options chain provider
#[async_trait]
pub trait OptionsDataPort: Send + Sync {
    /// Available expiration dates for a symbol, ascending
    async fn list_expirations(&self, symbol: &str)
        -> Result<Vec<NaiveDate>, OptionsDataError>;

    /// Full chain snapshot for one expiration
    async fn get_chain(&self, symbol: &str, expiry: NaiveDate)
        -> Result<OptionChain, OptionsDataError>;

    /// Implied volatility of the at-the-money contract
    async fn get_atm_implied_vol(&self, symbol: &str, expiry: NaiveDate)
        -> Result<f64, OptionsDataError>;

    /// Nearest expiration at least `min_days` out from `today`.
    /// `None` when the listing is empty or everything is too close.
    async fn nearest_expiration(
        &self,
        symbol: &str,
        today: NaiveDate,
        min_days: i64,
    ) -> Result<Option<NaiveDate>, OptionsDataError> {
        let expirations = self.list_expirations(symbol).await?;
        Ok(expirations
            .into_iter()
            .find(|exp| (*exp - today).num_days() >= min_days))
    }
}
