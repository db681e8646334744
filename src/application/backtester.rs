//! Close-Price Backtester
//!
//! Simple simulation: strategies see history up to each bar and any
//! signal executes at that bar's close. No slippage, no fees, no
//! intraday fills — a sanity harness, not a research-grade engine.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::portfolio::Portfolio;
use crate::domain::returns::PricePoint;
use crate::domain::signal::TradeAction;
use crate::ports::market_data::{HistoricalQuery, MarketDataError, MarketDataPort};
use crate::strategy::params::{CrossoverConfig, DetectorConfig};
use crate::strategy::traits::{build_strategy, Sizing, StrategyKind};

/// Backtest run parameters
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub strategy: StrategyKind,
    pub detector: DetectorConfig,
    pub crossover: CrossoverConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: None,
            strategy: StrategyKind::SmaCrossover,
            detector: DetectorConfig::default(),
            crossover: CrossoverConfig::default(),
        }
    }
}

/// A fill in the simulation
#[derive(Debug, Clone)]
pub struct ExecutedTrade {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: u32,
    pub price: f64,
}

/// Result of a run
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub initial_capital: f64,
    pub final_value: f64,
    pub trades: Vec<ExecutedTrade>,
    /// Mark-to-market equity at each simulated bar
    pub equity_curve: Vec<(DateTime<Utc>, f64)>,
}

impl BacktestReport {
    pub fn total_return_pct(&self) -> f64 {
        if self.initial_capital == 0.0 {
            return 0.0;
        }
        (self.final_value - self.initial_capital) / self.initial_capital * 100.0
    }
}

/// Drives strategies over fetched history
pub struct Backtester {
    market_data: Arc<dyn MarketDataPort>,
    config: BacktestConfig,
}

impl Backtester {
    pub fn new(market_data: Arc<dyn MarketDataPort>, config: BacktestConfig) -> Self {
        Self {
            market_data,
            config,
        }
    }

    /// Run the configured strategy over each symbol's history.
    /// Timestamps are aligned by intersection so multi-symbol runs
    /// step through sessions all symbols traded.
    pub async fn run(&self, symbols: &[String]) -> Result<BacktestReport, MarketDataError> {
        let mut histories: HashMap<String, Vec<PricePoint>> = HashMap::new();
        for symbol in symbols {
            let query = HistoricalQuery {
                symbol: symbol.clone(),
                start: self.config.start,
                end: self.config.end,
                interval: crate::ports::market_data::Interval::Daily,
            };
            let bars = self.market_data.get_history(&query).await?;
            tracing::debug!("{}: {} bars fetched", symbol, bars.len());
            histories.insert(symbol.clone(), bars);
        }

        // Session timestamps present for every symbol, ascending
        let mut common: Option<Vec<DateTime<Utc>>> = None;
        for bars in histories.values() {
            let stamps: Vec<DateTime<Utc>> = bars.iter().map(|b| b.timestamp).collect();
            common = Some(match common {
                None => stamps,
                Some(existing) => existing
                    .into_iter()
                    .filter(|t| stamps.contains(t))
                    .collect(),
            });
        }
        let mut timeline = common.unwrap_or_default();
        timeline.sort();

        let mut strategies: HashMap<String, _> = symbols
            .iter()
            .map(|symbol| {
                (
                    symbol.clone(),
                    build_strategy(
                        self.config.strategy,
                        symbol,
                        self.config.detector,
                        self.config.crossover,
                    ),
                )
            })
            .collect();

        let mut portfolio = Portfolio::new(self.config.initial_capital);
        let mut trades = Vec::new();
        let mut equity_curve = Vec::with_capacity(timeline.len());

        for t in &timeline {
            let mut closes: HashMap<String, f64> = HashMap::new();

            for symbol in symbols {
                let bars = &histories[symbol];
                let visible: Vec<PricePoint> = bars
                    .iter()
                    .filter(|b| b.timestamp <= *t)
                    .cloned()
                    .collect();
                let close = match visible.last() {
                    Some(bar) => bar.close,
                    None => continue,
                };
                closes.insert(symbol.clone(), close);

                let strategy = strategies.get_mut(symbol).expect("strategy per symbol");
                strategy.on_data(symbol, &visible);
                for signal in strategy.generate_signals() {
                    let quantity = match signal.sizing {
                        Sizing::Shares(q) => q,
                        Sizing::Dollars(d) if close > 0.0 => (d / close).floor() as u32,
                        Sizing::Dollars(_) => 0,
                    };
                    if quantity == 0 {
                        continue;
                    }
                    let filled = match signal.action {
                        TradeAction::Buy => portfolio.buy(symbol, quantity, close),
                        TradeAction::Sell => portfolio.sell(symbol, quantity, close),
                    };
                    if filled {
                        trades.push(ExecutedTrade {
                            timestamp: *t,
                            symbol: symbol.clone(),
                            action: signal.action,
                            quantity,
                            price: close,
                        });
                    }
                }
            }

            equity_curve.push((*t, portfolio.total_value(&closes)));
        }

        let final_value = equity_curve
            .last()
            .map(|(_, v)| *v)
            .unwrap_or(self.config.initial_capital);

        tracing::info!(
            "Backtest complete: {} trades, final value ${:.2}",
            trades.len(),
            final_value
        );

        Ok(BacktestReport {
            initial_capital: self.config.initial_capital,
            final_value,
            trades,
            equity_curve,
        })
    }
}
