//! Memo Sink Port
//!
//! Trait abstraction for the reviewable trade memo artifact. The
//! pipeline supplies everything the memo needs: contract, quantity,
//! allocation, action, and the regime context the decision was made in.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::regime::{RegimeInputs, RegimeState};
use crate::domain::signal::{TradeSignal, VolatilitySignal};

#[derive(Debug, Error)]
pub enum MemoError {
    #[error("Failed to write memo: {0}")]
    WriteFailed(String),
}

/// Context the memo is rendered against
#[derive(Debug, Clone)]
pub struct MemoContext {
    pub regime: RegimeState,
    pub regime_inputs: RegimeInputs,
    pub volatility: VolatilitySignal,
}

/// Consumer of finished trade signals
#[async_trait]
pub trait MemoSink: Send + Sync {
    /// Persist a review artifact; returns an identifier (e.g. a path)
    async fn write_memo(
        &self,
        signal: &TradeSignal,
        context: &MemoContext,
    ) -> Result<String, MemoError>;
}
