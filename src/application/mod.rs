//! Application Layer - Orchestration
//!
//! Wires detection, regime gating, sizing, and contract selection into
//! per-symbol scans, plus the close-price simulator.

pub mod backtester;
pub mod pipeline;
pub mod universe;

pub use backtester::{BacktestConfig, BacktestReport, Backtester, ExecutedTrade};
pub use pipeline::{
    PipelineConfig, PipelineError, ScanOutcome, SignalPipeline, SymbolReport,
};
