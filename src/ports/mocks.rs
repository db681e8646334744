//! Recording Mocks
//!
//! Hand-rolled port implementations for tests: controlled responses,
//! recorded calls. Not compiled out of the crate so integration tests
//! can drive the pipeline without network access.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::domain::returns::PricePoint;
use crate::ports::market_data::{HistoricalQuery, MarketDataError, MarketDataPort};
use crate::ports::memo::{MemoContext, MemoError, MemoSink};
use crate::ports::options_data::{OptionChain, OptionsDataError, OptionsDataPort};
use crate::domain::signal::TradeSignal;

/// Mock market data port with per-symbol canned responses
#[derive(Debug, Default)]
pub struct MockMarketData {
    histories: HashMap<String, Vec<PricePoint>>,
    latest_prices: HashMap<String, f64>,
    failing: HashSet<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the bar history for a symbol
    pub fn with_history(mut self, symbol: &str, bars: Vec<PricePoint>) -> Self {
        self.histories.insert(symbol.to_string(), bars);
        self
    }

    /// Builder method to set the latest price for a symbol
    pub fn with_latest_price(mut self, symbol: &str, price: f64) -> Self {
        self.latest_prices.insert(symbol.to_string(), price);
        self
    }

    /// Builder method to make every call for a symbol fail
    pub fn with_failure(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn get_history(
        &self,
        query: &HistoricalQuery,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("get_history:{}", query.symbol));
        if self.failing.contains(&query.symbol) {
            return Err(MarketDataError::unavailable(&query.symbol, "mock failure"));
        }
        self.histories
            .get(&query.symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::unavailable(&query.symbol, "no history configured"))
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("get_latest_price:{}", symbol));
        if self.failing.contains(symbol) {
            return Err(MarketDataError::unavailable(symbol, "mock failure"));
        }
        self.latest_prices
            .get(symbol)
            .copied()
            .ok_or_else(|| MarketDataError::unavailable(symbol, "no price configured"))
    }
}

/// Mock options data port with canned chains
#[derive(Debug, Default)]
pub struct MockOptionsData {
    expirations: HashMap<String, Vec<NaiveDate>>,
    chains: HashMap<(String, NaiveDate), OptionChain>,
    atm_ivs: HashMap<String, f64>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockOptionsData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expirations(mut self, symbol: &str, dates: Vec<NaiveDate>) -> Self {
        self.expirations.insert(symbol.to_string(), dates);
        self
    }

    pub fn with_chain(mut self, symbol: &str, expiry: NaiveDate, chain: OptionChain) -> Self {
        self.chains.insert((symbol.to_string(), expiry), chain);
        self
    }

    pub fn with_atm_iv(mut self, symbol: &str, iv: f64) -> Self {
        self.atm_ivs.insert(symbol.to_string(), iv);
        self
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OptionsDataPort for MockOptionsData {
    async fn list_expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>, OptionsDataError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("list_expirations:{}", symbol));
        self.expirations
            .get(symbol)
            .cloned()
            .ok_or_else(|| OptionsDataError::unavailable(symbol, "no expirations configured"))
    }

    async fn get_chain(
        &self,
        symbol: &str,
        expiry: NaiveDate,
    ) -> Result<OptionChain, OptionsDataError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("get_chain:{}:{}", symbol, expiry));
        self.chains
            .get(&(symbol.to_string(), expiry))
            .cloned()
            .ok_or_else(|| OptionsDataError::unavailable(symbol, "no chain configured"))
    }

    async fn get_atm_implied_vol(
        &self,
        symbol: &str,
        _expiry: NaiveDate,
    ) -> Result<f64, OptionsDataError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("get_atm_implied_vol:{}", symbol));
        self.atm_ivs
            .get(symbol)
            .copied()
            .ok_or_else(|| OptionsDataError::unavailable(symbol, "no IV configured"))
    }
}

/// Memo sink that records written signals instead of touching disk
#[derive(Debug, Default)]
pub struct MockMemoSink {
    written: Arc<Mutex<Vec<TradeSignal>>>,
}

impl MockMemoSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn written_signals(&self) -> Vec<TradeSignal> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl MemoSink for MockMemoSink {
    async fn write_memo(
        &self,
        signal: &TradeSignal,
        _context: &MemoContext,
    ) -> Result<String, MemoError> {
        self.written.lock().unwrap().push(signal.clone());
        Ok(format!("memo://{}", signal.symbol))
    }
}
