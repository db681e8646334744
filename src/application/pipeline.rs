//! Signal Pipeline
//!
//! Per-symbol scan: fetch history, detect a volatility breakout,
//! classify the macro regime, gate and size the allocation, pick an
//! affordable OTM contract, emit a trade signal. Every terminal branch
//! is a distinct outcome so a batch scan can report exactly why each
//! symbol produced nothing.
//!
//! Fan-out over symbols is bounded by a semaphore, and calls to the
//! market data source can additionally be serialized behind a mutex —
//! quote providers tend to throttle or misbehave under real
//! parallelism, so the safe default is low concurrency with serialized
//! fetches.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock, Semaphore};
use tokio::task::JoinSet;

use crate::domain::contract::{ContractSelector, OptionType};
use crate::domain::kelly::{KellySizer, SizingError};
use crate::domain::regime::{RegimeClassifier, RegimeInputs, RegimeState, RegimeThresholds};
use crate::domain::returns::ReturnSeries;
use crate::domain::signal::{TradeAction, TradeSignal, VolatilitySignal};
use crate::ports::cache::{daily_key, CachePort};
use crate::ports::market_data::{HistoricalQuery, MarketDataPort};
use crate::ports::memo::{MemoContext, MemoSink};
use crate::ports::options_data::OptionsDataPort;
use crate::strategy::params::{DetectorConfig, ParamsError, SizingConfig};
use crate::strategy::volatility::VolatilityDetector;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ParamsError),

    #[error("Sizing error: {0}")]
    Sizing(#[from] SizingError),
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Capital the sizer works from
    pub capital: f64,
    /// Calendar days of history to request
    pub history_days: i64,
    /// Skip expirations closer than this many days (0DTE guard)
    pub min_days_to_expiry: i64,
    /// Concurrent symbol scans
    pub max_concurrent_scans: usize,
    /// Serialize data-source calls behind a mutex
    pub serialize_fetches: bool,
    /// TTL for cached per-day statistics
    pub cache_ttl_secs: u64,
    /// Volatility index symbol for regime inputs
    pub vix_symbol: String,
    /// Broad-market symbol for the trend input
    pub market_symbol: String,
    /// Small-cap symbol for the breadth input
    pub breadth_symbol: String,
    /// Evaluation date override; defaults to today (UTC)
    pub as_of: Option<NaiveDate>,
    pub detector: DetectorConfig,
    pub sizing: SizingConfig,
    pub regime: RegimeThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capital: 10_000.0,
            history_days: 90,
            min_days_to_expiry: 2,
            max_concurrent_scans: 2,
            serialize_fetches: true,
            cache_ttl_secs: 300,
            vix_symbol: "^VIX".to_string(),
            market_symbol: "SPY".to_string(),
            breadth_symbol: "IWM".to_string(),
            as_of: None,
            detector: DetectorConfig::default(),
            sizing: SizingConfig::default(),
            regime: RegimeThresholds::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.detector.validate()?;
        self.sizing.validate()?;
        Ok(())
    }
}

/// Why a symbol's scan terminated
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The pipeline ran to completion and emitted a signal
    Signal(Box<TradeSignal>),
    /// Latest move did not clear the breakout threshold
    NoBreakout,
    /// Too few data points for the lookback; not yet evaluable
    InsufficientData,
    /// Zero variance in the return window; z-score undefined
    DegenerateStatistics,
    /// Regime multiplier for the signal direction is zero
    RegimeBlocked,
    /// No OTM contract fits the allocation
    NoAffordableContract,
    /// Upstream fetch failed or returned nothing
    DataUnavailable(String),
    /// Caller bug (bad parameters), distinct from data availability
    Failed(String),
}

/// Per-symbol scan result
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolReport {
    pub symbol: String,
    pub outcome: ScanOutcome,
}

/// Cached per-day statistics snapshot; derived and re-computable, so
/// concurrent last-write-wins updates are harmless
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedStats {
    z_score: f64,
    rolling_std: f64,
    rolling_mean: f64,
    current_return: f64,
    is_breakout: bool,
}

impl CachedStats {
    fn from_signal(signal: &VolatilitySignal) -> Self {
        Self {
            z_score: signal.z_score,
            rolling_std: signal.rolling_std,
            rolling_mean: signal.rolling_mean,
            current_return: signal.current_return,
            is_breakout: signal.is_breakout,
        }
    }

    fn into_signal(self, symbol: &str) -> VolatilitySignal {
        VolatilitySignal {
            symbol: symbol.to_string(),
            z_score: self.z_score,
            rolling_std: self.rolling_std,
            rolling_mean: self.rolling_mean,
            current_return: self.current_return,
            is_breakout: self.is_breakout,
        }
    }
}

/// Orchestrates the scan across a symbol universe
pub struct SignalPipeline {
    config: PipelineConfig,
    market_data: Arc<dyn MarketDataPort>,
    options_data: Arc<dyn OptionsDataPort>,
    cache: Arc<dyn CachePort>,
    memo_sink: Option<Arc<dyn MemoSink>>,
    detector: VolatilityDetector,
    classifier: RegimeClassifier,
    sizer: KellySizer,
    selector: ContractSelector,
    /// Serializes data-source calls when the provider is not safe for
    /// concurrent use
    fetch_lock: Arc<Mutex<()>>,
    scan_permits: Arc<Semaphore>,
    cancelled: Arc<RwLock<bool>>,
}

impl SignalPipeline {
    pub fn new(
        config: PipelineConfig,
        market_data: Arc<dyn MarketDataPort>,
        options_data: Arc<dyn OptionsDataPort>,
        cache: Arc<dyn CachePort>,
        memo_sink: Option<Arc<dyn MemoSink>>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;

        let detector = VolatilityDetector::new(config.detector);
        let classifier = RegimeClassifier::new(config.regime);
        let sizer = KellySizer::new(config.sizing.max_risk_per_trade, config.sizing.kelly_fraction);
        let scan_permits = Arc::new(Semaphore::new(config.max_concurrent_scans.max(1)));

        Ok(Self {
            config,
            market_data,
            options_data,
            cache,
            memo_sink,
            detector,
            classifier,
            sizer,
            selector: ContractSelector::new(),
            fetch_lock: Arc::new(Mutex::new(())),
            scan_permits,
            cancelled: Arc::new(RwLock::new(false)),
        })
    }

    fn as_of(&self) -> NaiveDate {
        self.config.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Abort the scan between symbols. Reports already produced remain
    /// valid; unstarted symbols are skipped.
    pub async fn cancel(&self) {
        *self.cancelled.write().await = true;
        tracing::info!("Scan cancellation requested");
    }

    /// Macro inputs for regime classification. The classifier itself
    /// never fetches; any upstream failure degrades to the documented
    /// neutral defaults (vix 20, flat trend, flat breadth).
    pub async fn fetch_regime_inputs(&self) -> RegimeInputs {
        let defaults = RegimeInputs::default();

        let vix_level = match self.fetch_latest(&self.config.vix_symbol).await {
            Ok(level) => level,
            Err(reason) => {
                tracing::warn!(
                    "VIX fetch failed ({}), using default {}",
                    reason,
                    defaults.vix_level
                );
                defaults.vix_level
            }
        };

        let market_trend_return = match self.fetch_trend(&self.config.market_symbol).await {
            Ok(trend) => trend,
            Err(reason) => {
                tracing::warn!("Trend fetch failed ({}), using flat trend", reason);
                defaults.market_trend_return
            }
        };

        let breadth_diff = match self.fetch_trend(&self.config.breadth_symbol).await {
            Ok(small_cap) => small_cap - market_trend_return,
            Err(reason) => {
                tracing::warn!("Breadth fetch failed ({}), using flat breadth", reason);
                defaults.breadth_diff
            }
        };

        RegimeInputs {
            vix_level,
            market_trend_return,
            breadth_diff,
        }
    }

    async fn fetch_latest(&self, symbol: &str) -> Result<f64, String> {
        let _guard = if self.config.serialize_fetches {
            Some(self.fetch_lock.lock().await)
        } else {
            None
        };
        self.market_data
            .get_latest_price(symbol)
            .await
            .map_err(|e| e.to_string())
    }

    /// Return over the trailing week of bars for a symbol
    async fn fetch_trend(&self, symbol: &str) -> Result<f64, String> {
        let start = self.as_of() - chrono::Duration::days(7);
        let query = HistoricalQuery::daily(symbol, start);

        let _guard = if self.config.serialize_fetches {
            Some(self.fetch_lock.lock().await)
        } else {
            None
        };
        let bars = self
            .market_data
            .get_history(&query)
            .await
            .map_err(|e| e.to_string())?;
        drop(_guard);

        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) if first.close > 0.0 => {
                Ok(last.close / first.close - 1.0)
            }
            _ => Err(format!("empty history for {}", symbol)),
        }
    }

    /// Scan a universe concurrently. Always completes: a failed symbol
    /// degrades to its own outcome and never aborts the batch.
    /// Completion order is not fetch order; reports carry their symbol.
    pub async fn scan_universe(self: &Arc<Self>, symbols: &[String]) -> Vec<SymbolReport> {
        let regime_inputs = self.fetch_regime_inputs().await;
        let regime = self.classifier.classify(&regime_inputs);
        tracing::info!(
            "Market regime: {} (vix {:.1}, trend {:+.2}%)",
            regime,
            regime_inputs.vix_level,
            regime_inputs.market_trend_return * 100.0
        );

        let mut tasks = JoinSet::new();
        for symbol in symbols {
            let pipeline = Arc::clone(self);
            let symbol = symbol.clone();
            let inputs = regime_inputs;
            tasks.spawn(async move {
                let _permit = pipeline
                    .scan_permits
                    .acquire()
                    .await
                    .expect("semaphore closed");
                if *pipeline.cancelled.read().await {
                    return None;
                }
                let outcome = pipeline.evaluate_symbol(&symbol, &inputs, regime).await;
                Some(SymbolReport { symbol, outcome })
            });
        }

        let mut reports = Vec::with_capacity(symbols.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(report)) => reports.push(report),
                Ok(None) => {}
                Err(e) => tracing::error!("Scan task panicked: {}", e),
            }
        }
        reports
    }

    /// Run the full state machine for one symbol
    pub async fn evaluate_symbol(
        &self,
        symbol: &str,
        regime_inputs: &RegimeInputs,
        regime: RegimeState,
    ) -> ScanOutcome {
        // DETECT, via cache when today's statistics are already known
        let signal = match self.detect_with_cache(symbol).await {
            Ok(Some(signal)) => signal,
            Ok(None) => return ScanOutcome::DegenerateStatistics,
            Err(outcome) => return outcome,
        };

        if !signal.is_breakout {
            tracing::debug!("{}: z {:.2}, no breakout", symbol, signal.z_score);
            return ScanOutcome::NoBreakout;
        }

        let action = signal.action();
        tracing::info!(
            "{}: breakout z {:.2} ({}), confidence {:.1}%",
            symbol,
            signal.z_score,
            action,
            signal.confidence() * 100.0
        );

        // GATE
        let multipliers = self.classifier.multipliers(regime);
        let multiplier = multipliers.for_long(action == TradeAction::Buy);
        if multiplier == 0.0 {
            tracing::info!("{}: {} blocked by {} regime", symbol, action, regime);
            return ScanOutcome::RegimeBlocked;
        }

        // SIZE: stop at twice the daily rolling std
        let stop_loss_pct = 2.0 * signal.rolling_std;
        let decision = match self.sizer.size(
            self.config.capital,
            stop_loss_pct,
            self.config.sizing.win_rate,
            self.config.sizing.win_loss_ratio,
        ) {
            Ok(decision) => decision,
            Err(e) => {
                // Caller bug, not a market condition; surfaced distinctly
                tracing::error!("{}: sizing rejected: {}", symbol, e);
                return ScanOutcome::Failed(e.to_string());
            }
        };
        let allocation = decision.dollar_allocation * multiplier;
        if allocation <= 0.0 {
            tracing::info!("{}: zero allocation after regime adjustment", symbol);
            return ScanOutcome::NoAffordableContract;
        }

        // SELECT
        let (contract, quantity) = match self.select_contract(symbol, action, allocation).await {
            Ok(Some(pick)) => pick,
            Ok(None) => return ScanOutcome::NoAffordableContract,
            Err(outcome) => return outcome,
        };

        let trade = TradeSignal {
            symbol: symbol.to_string(),
            action,
            allocation,
            selected_contract: contract,
            quantity,
            strategy_tag: "vol_breakout".to_string(),
        };

        if let Some(sink) = &self.memo_sink {
            let context = MemoContext {
                regime,
                regime_inputs: *regime_inputs,
                volatility: signal.clone(),
            };
            match sink.write_memo(&trade, &context).await {
                Ok(path) => tracing::info!("{}: memo written to {}", symbol, path),
                Err(e) => tracing::warn!("{}: memo write failed: {}", symbol, e),
            }
        }

        tracing::info!(
            "{}: {} {} x{} @ ${:.2} (alloc ${:.2})",
            symbol,
            trade.action,
            trade.selected_contract.symbol,
            trade.quantity,
            trade.selected_contract.last_price,
            trade.allocation
        );
        ScanOutcome::Signal(Box::new(trade))
    }

    /// Detect with the per-day cache in front of the history fetch.
    /// `Ok(None)` means degenerate statistics; `Err` carries the
    /// terminal outcome (insufficient data or fetch failure).
    async fn detect_with_cache(
        &self,
        symbol: &str,
    ) -> Result<Option<VolatilitySignal>, ScanOutcome> {
        let key = daily_key(symbol, self.as_of());

        if let Some(raw) = self.cache.get(&key).await {
            if let Ok(stats) = serde_json::from_str::<CachedStats>(&raw) {
                tracing::debug!("{}: statistics from cache", symbol);
                return Ok(Some(stats.into_signal(symbol)));
            }
            // Unparseable entry: fall through to a fresh computation
        }

        let start = self.as_of() - chrono::Duration::days(self.config.history_days);
        let query = HistoricalQuery::daily(symbol, start);

        let _guard = if self.config.serialize_fetches {
            Some(self.fetch_lock.lock().await)
        } else {
            None
        };
        let bars = match self.market_data.get_history(&query).await {
            Ok(bars) => bars,
            Err(e) => {
                tracing::warn!("{}: history fetch failed: {}", symbol, e);
                return Err(ScanOutcome::DataUnavailable(e.to_string()));
            }
        };
        drop(_guard);

        if bars.is_empty() {
            return Err(ScanOutcome::DataUnavailable("empty history".to_string()));
        }

        let returns = ReturnSeries::from_bars(&bars);
        if returns.len() < self.config.detector.lookback + 1 {
            return Err(ScanOutcome::InsufficientData);
        }

        let signal = self.detector.detect(symbol, &returns);
        if let Some(ref signal) = signal {
            let stats = CachedStats::from_signal(signal);
            if let Ok(raw) = serde_json::to_string(&stats) {
                self.cache
                    .set(&key, raw, Duration::from_secs(self.config.cache_ttl_secs))
                    .await;
            }
        }
        Ok(signal)
    }

    /// Resolve expiry, chain, and spot, then pick the nearest affordable
    /// OTM contract for the direction.
    async fn select_contract(
        &self,
        symbol: &str,
        action: TradeAction,
        allocation: f64,
    ) -> Result<Option<(crate::domain::contract::OptionContract, u32)>, ScanOutcome> {
        let direction = match action {
            TradeAction::Buy => OptionType::Call,
            TradeAction::Sell => OptionType::Put,
        };

        let expiry = match self
            .options_data
            .nearest_expiration(symbol, self.as_of(), self.config.min_days_to_expiry)
            .await
        {
            Ok(Some(expiry)) => expiry,
            Ok(None) => {
                tracing::warn!("{}: no expiration beyond {} days", symbol, self.config.min_days_to_expiry);
                return Ok(None);
            }
            Err(e) => return Err(ScanOutcome::DataUnavailable(e.to_string())),
        };

        let chain = match self.options_data.get_chain(symbol, expiry).await {
            Ok(chain) => chain,
            Err(e) => return Err(ScanOutcome::DataUnavailable(e.to_string())),
        };
        let side = match direction {
            OptionType::Call => &chain.calls,
            OptionType::Put => &chain.puts,
        };

        // Latest trade price, falling back to nothing: without a spot
        // there is no moneyness to measure against.
        let current_price = match self.fetch_latest(symbol).await {
            Ok(price) if price > 0.0 => price,
            Ok(price) => {
                return Err(ScanOutcome::DataUnavailable(format!(
                    "non-positive spot {}",
                    price
                )))
            }
            Err(reason) => return Err(ScanOutcome::DataUnavailable(reason)),
        };

        let picked = match self
            .selector
            .select(side, direction, current_price, allocation)
        {
            Some(contract) => contract.clone(),
            None => {
                tracing::info!(
                    "{}: no affordable {} within ${:.2}",
                    symbol,
                    direction,
                    allocation
                );
                return Ok(None);
            }
        };

        let quantity = self.selector.quantity(&picked, allocation);
        if quantity == 0 {
            // Guarded against by selection, kept as a no-trade fallback
            return Ok(None);
        }
        Ok(Some((picked, quantity)))
    }
}
