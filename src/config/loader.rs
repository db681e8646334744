//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching the
//! config.toml structure.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::rest::QuoteApiConfig;
use crate::application::pipeline::PipelineConfig;
use crate::domain::regime::RegimeThresholds;
use crate::strategy::params::{CrossoverConfig, DetectorConfig, SizingConfig};

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scan: ScanSection,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub regime: RegimeThresholds,
    #[serde(default)]
    pub crossover: CrossoverConfig,
    pub data: DataSection,
    #[serde(default)]
    pub memo: MemoSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Scan behavior section
#[derive(Debug, Clone, Deserialize)]
pub struct ScanSection {
    /// Capital the sizer works from
    pub capital: f64,
    /// Calendar days of history per symbol
    pub history_days: i64,
    /// Skip expirations closer than this (0DTE guard)
    pub min_days_to_expiry: i64,
    /// Concurrent symbol scans; keep low, providers throttle
    pub max_concurrent_scans: usize,
    /// Serialize data-source calls behind a mutex
    pub serialize_fetches: bool,
    /// TTL for cached per-day statistics, in seconds
    pub cache_ttl_secs: u64,
    /// Volatility index symbol
    pub vix_symbol: String,
    /// Broad-market trend symbol
    pub market_symbol: String,
    /// Small-cap breadth symbol
    pub breadth_symbol: String,
}

/// Data provider section
#[derive(Debug, Clone, Deserialize)]
pub struct DataSection {
    /// Quote API base URL
    pub api_base_url: String,
    /// API key; POLYGON_API_KEY env var takes precedence
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Memo output section
#[derive(Debug, Clone, Deserialize)]
pub struct MemoSection {
    /// Output directory for markdown memos (~ expands)
    pub output_dir: String,
}

impl Default for MemoSection {
    fn default() -> Self {
        Self {
            output_dir: "memos/trades".to_string(),
        }
    }
}

/// Logging section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detector
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        self.sizing
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        self.crossover
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if self.scan.capital <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "capital must be > 0, got {}",
                self.scan.capital
            )));
        }
        if self.scan.history_days <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "history_days must be > 0, got {}",
                self.scan.history_days
            )));
        }
        if self.scan.max_concurrent_scans == 0 {
            return Err(ConfigError::ValidationError(
                "max_concurrent_scans must be >= 1".to_string(),
            ));
        }
        if self.data.api_base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_base_url cannot be empty".to_string(),
            ));
        }
        if self.regime.vix_elevated >= self.regime.vix_high {
            return Err(ConfigError::ValidationError(format!(
                "vix_elevated {} must be below vix_high {}",
                self.regime.vix_elevated, self.regime.vix_high
            )));
        }
        Ok(())
    }

    /// Assemble the pipeline configuration
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            capital: self.scan.capital,
            history_days: self.scan.history_days,
            min_days_to_expiry: self.scan.min_days_to_expiry,
            max_concurrent_scans: self.scan.max_concurrent_scans,
            serialize_fetches: self.scan.serialize_fetches,
            cache_ttl_secs: self.scan.cache_ttl_secs,
            vix_symbol: self.scan.vix_symbol.clone(),
            market_symbol: self.scan.market_symbol.clone(),
            breadth_symbol: self.scan.breadth_symbol.clone(),
            as_of: None,
            detector: self.detector,
            sizing: self.sizing,
            regime: self.regime,
        }
    }

    /// Assemble the quote API configuration
    pub fn quote_api_config(&self) -> QuoteApiConfig {
        QuoteApiConfig {
            api_base_url: self.data.api_base_url.clone(),
            api_key: self.data.api_key.clone(),
            timeout: Duration::from_secs(self.data.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [scan]
        capital = 10000.0
        history_days = 90
        min_days_to_expiry = 2
        max_concurrent_scans = 2
        serialize_fetches = true
        cache_ttl_secs = 300
        vix_symbol = "^VIX"
        market_symbol = "SPY"
        breadth_symbol = "IWM"

        [detector]
        lookback = 20
        z_threshold = 1.5

        [sizing]
        win_rate = 0.4
        win_loss_ratio = 3.0
        kelly_fraction = 0.5
        max_risk_per_trade = 0.05

        [regime]
        vix_high = 25.0
        vix_elevated = 18.0
        bearish_trend = -0.01

        [data]
        api_base_url = "https://api.polygon.io"
        timeout_secs = 30

        [memo]
        output_dir = "memos/trades"

        [logging]
        level = "info"
    "#;

    #[test]
    fn test_sample_config_parses_and_validates() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.capital, 10_000.0);
        assert_eq!(config.detector.lookback, 20);
        assert_eq!(config.regime.vix_high, 25.0);
    }

    #[test]
    fn test_optional_sections_default() {
        let minimal = r#"
            [scan]
            capital = 5000.0
            history_days = 60
            min_days_to_expiry = 2
            max_concurrent_scans = 1
            serialize_fetches = true
            cache_ttl_secs = 300
            vix_symbol = "^VIX"
            market_symbol = "SPY"
            breadth_symbol = "IWM"

            [data]
            api_base_url = "https://api.polygon.io"
            timeout_secs = 30
        "#;
        let config: Config = toml::from_str(minimal).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.detector.lookback, 20);
        assert_eq!(config.sizing.win_rate, 0.40);
        assert_eq!(config.memo.output_dir, "memos/trades");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_zero_capital() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.scan.capital = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_vix_band() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.regime.vix_elevated = 30.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pipeline_config_assembly() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.capital, 10_000.0);
        assert_eq!(pipeline.vix_symbol, "^VIX");
        assert!(pipeline.serialize_fetches);
        assert!(pipeline.as_of.is_none());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result: Result<Config, _> = toml::from_str("scan = 12");
        assert!(result.is_err());
    }
}
