//! volscan - Volatility Breakout Options Scanner
//!
//! Scans for anomalous moves, gates them by market regime, sizes with
//! risk-capped Kelly, and writes reviewable trade memos.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use volscan::adapters::cli::{BacktestCmd, CliApp, Command, RegimeCmd, ScanCmd};
use volscan::adapters::memo::TradeMemoWriter;
use volscan::adapters::rest::QuoteApiClient;
use volscan::application::backtester::{BacktestConfig, Backtester};
use volscan::application::pipeline::{ScanOutcome, SignalPipeline};
use volscan::application::universe;
use volscan::config::load_config;
use volscan::domain::regime::RegimeClassifier;
use volscan::ports::cache::InMemoryCache;
use volscan::ports::memo::MemoSink;
use volscan::strategy::traits::StrategyKind;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present (API keys live there, not in config.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    init_logging(app.verbose, app.debug);

    match app.command {
        Command::Scan(cmd) => scan_command(cmd).await,
        Command::Regime(cmd) => regime_command(cmd).await,
        Command::Backtest(cmd) => backtest_command(cmd).await,
    }
}

fn init_logging(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    fmt().with_env_filter(filter).init();
}

async fn scan_command(cmd: ScanCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;

    let client = Arc::new(
        QuoteApiClient::with_config(config.quote_api_config())
            .context("Failed to create quote API client")?,
    );
    let cache = Arc::new(InMemoryCache::new());
    let memo_sink: Option<Arc<dyn MemoSink>> = if cmd.no_memos {
        None
    } else {
        let dir = shellexpand::tilde(&config.memo.output_dir).to_string();
        Some(Arc::new(TradeMemoWriter::new(dir)))
    };

    let pipeline = Arc::new(
        SignalPipeline::new(
            config.pipeline_config(),
            client.clone(),
            client,
            cache,
            memo_sink,
        )
        .context("Failed to create pipeline")?,
    );

    // Ctrl+C aborts between symbols; finished reports stay valid
    let canceller = Arc::clone(&pipeline);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        canceller.cancel().await;
    });

    let symbols = if cmd.symbols.is_empty() {
        universe::combined()
    } else {
        cmd.symbols.clone()
    };
    tracing::info!("Scanning {} symbols", symbols.len());

    let mut reports = pipeline.scan_universe(&symbols).await;
    reports.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let mut signals = 0usize;
    for report in &reports {
        match &report.outcome {
            ScanOutcome::Signal(trade) => {
                signals += 1;
                println!(
                    "{:<6} SIGNAL  {} {} x{} @ ${:.2} (alloc ${:.2})",
                    report.symbol,
                    trade.action,
                    trade.selected_contract.symbol,
                    trade.quantity,
                    trade.selected_contract.last_price,
                    trade.allocation
                );
            }
            ScanOutcome::NoBreakout => println!("{:<6} no breakout", report.symbol),
            ScanOutcome::InsufficientData => println!("{:<6} insufficient data", report.symbol),
            ScanOutcome::DegenerateStatistics => {
                println!("{:<6} degenerate statistics", report.symbol)
            }
            ScanOutcome::RegimeBlocked => println!("{:<6} regime blocked", report.symbol),
            ScanOutcome::NoAffordableContract => {
                println!("{:<6} no affordable contract", report.symbol)
            }
            ScanOutcome::DataUnavailable(reason) => {
                println!("{:<6} data unavailable: {}", report.symbol, reason)
            }
            ScanOutcome::Failed(reason) => println!("{:<6} failed: {}", report.symbol, reason),
        }
    }
    println!("\n{} signals across {} symbols", signals, reports.len());
    Ok(())
}

async fn regime_command(cmd: RegimeCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;

    let client = Arc::new(
        QuoteApiClient::with_config(config.quote_api_config())
            .context("Failed to create quote API client")?,
    );
    let pipeline = Arc::new(SignalPipeline::new(
        config.pipeline_config(),
        client.clone(),
        client,
        Arc::new(InMemoryCache::new()),
        None,
    )?);

    let inputs = pipeline.fetch_regime_inputs().await;
    let classifier = RegimeClassifier::new(config.regime);
    let state = classifier.classify(&inputs);
    let multipliers = classifier.multipliers(state);

    println!("Regime:  {}", state);
    println!("VIX:     {:.2}", inputs.vix_level);
    println!("Trend:   {:+.2}%", inputs.market_trend_return * 100.0);
    println!("Breadth: {:+.2}%", inputs.breadth_diff * 100.0);
    println!(
        "Kelly multipliers: long {:.2}x, short {:.2}x",
        multipliers.long, multipliers.short
    );
    if multipliers.is_blocked() {
        println!("Trading blocked in this regime.");
    }
    Ok(())
}

async fn backtest_command(cmd: BacktestCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;

    let strategy: StrategyKind = cmd
        .strategy
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let start: NaiveDate = cmd.start.parse().context("Invalid start date")?;
    let end: Option<NaiveDate> = match &cmd.end {
        Some(raw) => Some(raw.parse().context("Invalid end date")?),
        None => None,
    };

    let client = Arc::new(
        QuoteApiClient::with_config(config.quote_api_config())
            .context("Failed to create quote API client")?,
    );

    let backtester = Backtester::new(
        client,
        BacktestConfig {
            initial_capital: config.scan.capital,
            start,
            end,
            strategy,
            detector: config.detector,
            crossover: config.crossover,
        },
    );

    let report = backtester
        .run(&cmd.symbols)
        .await
        .context("Backtest failed")?;

    println!("Strategy:       {}", strategy);
    println!("Symbols:        {}", cmd.symbols.join(", "));
    println!("Trades:         {}", report.trades.len());
    for trade in &report.trades {
        println!(
            "  {} {:<4} {:<6} x{} @ ${:.2}",
            trade.timestamp.format("%Y-%m-%d"),
            trade.action,
            trade.symbol,
            trade.quantity,
            trade.price
        );
    }
    println!("Initial value:  ${:.2}", report.initial_capital);
    println!("Final value:    ${:.2}", report.final_value);
    println!("Total return:   {:+.2}%", report.total_return_pct());
    Ok(())
}
