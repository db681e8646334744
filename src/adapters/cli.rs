//! CLI Command Definitions
//!
//! Argument parsing for the volscan binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// volscan - volatility breakout options scanner
#[derive(Parser, Debug)]
#[command(
    name = "volscan",
    version = env!("CARGO_PKG_VERSION"),
    about = "Volatility breakout options scanner",
    long_about = "Scans a symbol universe for anomalous moves, gates them by market \
                  regime, sizes a hypothetical position with risk-capped Kelly, and \
                  writes reviewable trade memos."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a universe for volatility breakout signals
    Scan(ScanCmd),

    /// Show the current market regime and multipliers
    Regime(RegimeCmd),

    /// Run a close-price simulation over historical data
    Backtest(BacktestCmd),
}

/// Scan for signals
#[derive(Parser, Debug)]
pub struct ScanCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Symbols to scan; defaults to the combined curated universe
    #[arg(short, long, value_name = "SYMBOL")]
    pub symbols: Vec<String>,

    /// Skip writing trade memos
    #[arg(long)]
    pub no_memos: bool,
}

/// Inspect the market regime
#[derive(Parser, Debug)]
pub struct RegimeCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,
}

/// Simulate a strategy on history
#[derive(Parser, Debug)]
pub struct BacktestCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Symbols to simulate
    #[arg(short, long, value_name = "SYMBOL", required = true)]
    pub symbols: Vec<String>,

    /// Strategy variant: vol_breakout, sma_crossover, buy_and_hold
    #[arg(long, default_value = "sma_crossover")]
    pub strategy: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long, default_value = "2024-01-01")]
    pub start: String,

    /// End date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub end: Option<String>,
}
