//! volscan - Volatility Breakout Options Scanner Library
//!
//! A personal research toolkit: scan a symbol universe for anomalous
//! moves, gate them by market regime, size a hypothetical position
//! with risk-capped Kelly, pick an affordable out-of-the-money
//! contract, and write a reviewable trade memo.
//!
//! # Modules
//!
//! - `domain`: Core types and pure numeric logic (returns, regime, Kelly, contracts)
//! - `ports`: Trait abstractions (MarketDataPort, OptionsDataPort, CachePort, MemoSink)
//! - `strategy`: Signal generation (volatility breakout, SMA crossover, buy-and-hold)
//! - `application`: SignalPipeline orchestrator, backtester, scan universes
//! - `adapters`: External implementations (quote API, memo writer, CLI)
//! - `config`: Configuration loading and validation

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod strategy;
