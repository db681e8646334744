//! Quote API Client
//!
//! HTTP client for a Polygon-style market data API implementing both
//! data ports: daily aggregates, last trade, and option chain
//! snapshots. An API key is required for real use; it can come from
//! configuration or the `POLYGON_API_KEY` environment variable.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::contract::{OptionContract, OptionType};
use crate::domain::returns::PricePoint;
use crate::ports::market_data::{HistoricalQuery, MarketDataError, MarketDataPort};
use crate::ports::options_data::{OptionChain, OptionsDataError, OptionsDataPort};

/// Quote API client configuration
#[derive(Debug, Clone)]
pub struct QuoteApiConfig {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for QuoteApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.polygon.io".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl QuoteApiConfig {
    /// API key with environment variable override
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("POLYGON_API_KEY")
            .ok()
            .or_else(|| self.api_key.clone())
    }
}

/// Market and options data over the quote API
#[derive(Debug, Clone)]
pub struct QuoteApiClient {
    config: QuoteApiConfig,
    http: Client,
}

impl QuoteApiClient {
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_config(QuoteApiConfig::default())
    }

    pub fn with_config(config: QuoteApiConfig) -> Result<Self, MarketDataError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MarketDataError::ParseError(format!("HTTP client build failed: {}", e)))?;
        Ok(Self { config, http })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let mut req = self.http.get(&url).query(query);
        if let Some(key) = self.config.resolved_api_key() {
            req = req.query(&[("apiKey", key)]);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Unavailable("request timed out".to_string())
            } else {
                FetchError::Unavailable(e.to_string())
            }
        })?;

        match response.status() {
            StatusCode::OK => response
                .json::<T>()
                .await
                .map_err(|e| FetchError::Parse(e.to_string())),
            StatusCode::TOO_MANY_REQUESTS => {
                Err(FetchError::RateLimited("quota exhausted".to_string()))
            }
            status => Err(FetchError::Unavailable(format!("HTTP {}", status))),
        }
    }
}

/// Intermediate error so one fetch path serves both port error types
#[derive(Debug)]
enum FetchError {
    Unavailable(String),
    RateLimited(String),
    Parse(String),
}

impl FetchError {
    fn into_market(self, symbol: &str) -> MarketDataError {
        match self {
            FetchError::Unavailable(reason) => MarketDataError::unavailable(symbol, reason),
            FetchError::RateLimited(msg) => MarketDataError::RateLimited(msg),
            FetchError::Parse(msg) => MarketDataError::ParseError(msg),
        }
    }

    fn into_options(self, symbol: &str) -> OptionsDataError {
        match self {
            FetchError::Unavailable(reason) => OptionsDataError::unavailable(symbol, reason),
            FetchError::RateLimited(msg) => OptionsDataError::RateLimited(msg),
            FetchError::Parse(msg) => OptionsDataError::ParseError(msg),
        }
    }
}

// Wire formats

#[derive(Debug, Deserialize)]
struct AggregatesResponse {
    #[serde(default)]
    results: Vec<AggregateBar>,
}

#[derive(Debug, Deserialize)]
struct AggregateBar {
    /// Epoch millis of the bar start
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

impl AggregateBar {
    fn into_price_point(self) -> Option<PricePoint> {
        let timestamp = Utc.timestamp_millis_opt(self.t).single()?;
        Some(PricePoint {
            timestamp,
            open: self.o,
            high: self.h,
            low: self.l,
            close: self.c,
            volume: self.v,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LastTradeResponse {
    results: Option<LastTrade>,
}

#[derive(Debug, Deserialize)]
struct LastTrade {
    /// Trade price
    p: f64,
}

#[derive(Debug, Deserialize)]
struct ContractsResponse {
    #[serde(default)]
    results: Vec<ContractListing>,
}

#[derive(Debug, Deserialize)]
struct ContractListing {
    expiration_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct ChainSnapshotResponse {
    #[serde(default)]
    results: Vec<ChainEntry>,
}

#[derive(Debug, Deserialize)]
struct ChainEntry {
    details: ChainDetails,
    #[serde(default)]
    day: Option<ChainDay>,
    #[serde(default)]
    open_interest: Option<u64>,
    #[serde(default)]
    implied_volatility: Option<f64>,
    #[serde(default)]
    underlying_asset: Option<UnderlyingAsset>,
}

#[derive(Debug, Deserialize)]
struct ChainDetails {
    ticker: String,
    strike_price: f64,
    expiration_date: NaiveDate,
    contract_type: String,
}

#[derive(Debug, Deserialize)]
struct ChainDay {
    #[serde(default)]
    close: Option<f64>,
    #[serde(default)]
    volume: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UnderlyingAsset {
    #[serde(default)]
    price: Option<f64>,
}

impl ChainEntry {
    fn into_contract(self) -> Option<OptionContract> {
        let contract_type = match self.details.contract_type.as_str() {
            "call" => OptionType::Call,
            "put" => OptionType::Put,
            _ => return None,
        };
        let day = self.day.as_ref();
        Some(OptionContract {
            symbol: self.details.ticker,
            strike: self.details.strike_price,
            expiry: self.details.expiration_date,
            last_price: day.and_then(|d| d.close).unwrap_or(0.0),
            contract_type,
            open_interest: self.open_interest.unwrap_or(0),
            volume: day.and_then(|d| d.volume).unwrap_or(0),
        })
    }
}

#[async_trait]
impl MarketDataPort for QuoteApiClient {
    async fn get_history(
        &self,
        query: &HistoricalQuery,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let end = query.end.unwrap_or_else(|| Utc::now().date_naive());
        let path = format!(
            "/v2/aggs/ticker/{}/range/1/{}/{}/{}",
            query.symbol,
            match query.interval {
                crate::ports::market_data::Interval::Daily => "day",
                crate::ports::market_data::Interval::Hourly => "hour",
            },
            query.start,
            end
        );

        let response: AggregatesResponse = self
            .get_json(&path, &[("sort", "asc".to_string())])
            .await
            .map_err(|e| e.into_market(&query.symbol))?;

        let bars: Vec<PricePoint> = response
            .results
            .into_iter()
            .filter_map(AggregateBar::into_price_point)
            .collect();

        if bars.is_empty() {
            return Err(MarketDataError::unavailable(
                &query.symbol,
                "empty aggregate response",
            ));
        }
        Ok(bars)
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        let path = format!("/v2/last/trade/{}", symbol);
        let response: LastTradeResponse = self
            .get_json(&path, &[])
            .await
            .map_err(|e| e.into_market(symbol))?;

        response
            .results
            .map(|t| t.p)
            .filter(|p| *p > 0.0)
            .ok_or_else(|| MarketDataError::unavailable(symbol, "no last trade"))
    }
}

#[async_trait]
impl OptionsDataPort for QuoteApiClient {
    async fn list_expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>, OptionsDataError> {
        let response: ContractsResponse = self
            .get_json(
                "/v3/reference/options/contracts",
                &[
                    ("underlying_ticker", symbol.to_string()),
                    ("limit", "1000".to_string()),
                ],
            )
            .await
            .map_err(|e| e.into_options(symbol))?;

        let mut dates: Vec<NaiveDate> = response
            .results
            .into_iter()
            .map(|c| c.expiration_date)
            .collect();
        dates.sort();
        dates.dedup();

        if dates.is_empty() {
            return Err(OptionsDataError::unavailable(symbol, "no listed contracts"));
        }
        Ok(dates)
    }

    async fn get_chain(
        &self,
        symbol: &str,
        expiry: NaiveDate,
    ) -> Result<OptionChain, OptionsDataError> {
        let path = format!("/v3/snapshot/options/{}", symbol);
        let response: ChainSnapshotResponse = self
            .get_json(
                &path,
                &[
                    ("expiration_date", expiry.to_string()),
                    ("limit", "250".to_string()),
                ],
            )
            .await
            .map_err(|e| e.into_options(symbol))?;

        let mut chain = OptionChain::default();
        for entry in response.results {
            if let Some(contract) = entry.into_contract() {
                match contract.contract_type {
                    OptionType::Call => chain.calls.push(contract),
                    OptionType::Put => chain.puts.push(contract),
                }
            }
        }
        Ok(chain)
    }

    async fn get_atm_implied_vol(
        &self,
        symbol: &str,
        expiry: NaiveDate,
    ) -> Result<f64, OptionsDataError> {
        let path = format!("/v3/snapshot/options/{}", symbol);
        let response: ChainSnapshotResponse = self
            .get_json(
                &path,
                &[
                    ("expiration_date", expiry.to_string()),
                    ("contract_type", "call".to_string()),
                    ("limit", "250".to_string()),
                ],
            )
            .await
            .map_err(|e| e.into_options(symbol))?;

        // Nearest strike to the snapshot's underlying price carries the
        // implied vol we report
        let spot = response
            .results
            .iter()
            .find_map(|e| e.underlying_asset.as_ref().and_then(|u| u.price))
            .ok_or_else(|| OptionsDataError::unavailable(symbol, "no underlying price"))?;

        response
            .results
            .iter()
            .filter(|e| e.implied_volatility.is_some())
            .min_by(|a, b| {
                let da = (a.details.strike_price - spot).abs();
                let db = (b.details.strike_price - spot).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .and_then(|e| e.implied_volatility)
            .ok_or_else(|| OptionsDataError::unavailable(symbol, "no implied vol in chain"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_bar_mapping() {
        let raw = r#"{
            "results": [
                {"t": 1706745600000, "o": 100.0, "h": 105.0, "l": 99.0, "c": 104.0, "v": 1200000.0},
                {"t": 1706832000000, "o": 104.0, "h": 106.0, "l": 103.0, "c": 105.5, "v": 900000.0}
            ]
        }"#;
        let response: AggregatesResponse = serde_json::from_str(raw).unwrap();
        let bars: Vec<PricePoint> = response
            .results
            .into_iter()
            .filter_map(AggregateBar::into_price_point)
            .collect();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 104.0);
        assert!(bars[0].timestamp < bars[1].timestamp);
    }

    #[test]
    fn test_empty_aggregates_default() {
        let response: AggregatesResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_chain_entry_mapping() {
        let raw = r#"{
            "results": [
                {
                    "details": {
                        "ticker": "O:NVDA250418C00150000",
                        "strike_price": 150.0,
                        "expiration_date": "2025-04-18",
                        "contract_type": "call"
                    },
                    "day": {"close": 3.25, "volume": 420},
                    "open_interest": 1500,
                    "implied_volatility": 0.62,
                    "underlying_asset": {"price": 142.5}
                },
                {
                    "details": {
                        "ticker": "O:NVDA250418P00135000",
                        "strike_price": 135.0,
                        "expiration_date": "2025-04-18",
                        "contract_type": "put"
                    },
                    "day": {"close": 2.10, "volume": 310},
                    "open_interest": 800
                }
            ]
        }"#;
        let response: ChainSnapshotResponse = serde_json::from_str(raw).unwrap();
        let contracts: Vec<OptionContract> = response
            .results
            .into_iter()
            .filter_map(ChainEntry::into_contract)
            .collect();
        assert_eq!(contracts.len(), 2);
        assert_eq!(contracts[0].contract_type, OptionType::Call);
        assert_eq!(contracts[0].last_price, 3.25);
        assert_eq!(contracts[1].contract_type, OptionType::Put);
        assert_eq!(contracts[1].open_interest, 800);
    }

    #[test]
    fn test_unknown_contract_type_dropped() {
        let entry = ChainEntry {
            details: ChainDetails {
                ticker: "X".to_string(),
                strike_price: 1.0,
                expiration_date: NaiveDate::from_ymd_opt(2025, 4, 18).unwrap(),
                contract_type: "straddle".to_string(),
            },
            day: None,
            open_interest: None,
            implied_volatility: None,
            underlying_asset: None,
        };
        assert!(entry.into_contract().is_none());
    }

    #[test]
    fn test_config_key_fallback_without_env() {
        let config = QuoteApiConfig {
            api_key: Some("from-config".to_string()),
            ..QuoteApiConfig::default()
        };
        // Without the env var set, the config value wins
        if std::env::var("POLYGON_API_KEY").is_err() {
            assert_eq!(config.resolved_api_key(), Some("from-config".to_string()));
        }
    }
}
