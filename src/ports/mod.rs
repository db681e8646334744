//! Ports Layer - Trait definitions for external collaborators
//!
//! Hexagonal seams the adapters implement:
//! - Market data (history, last trade)
//! - Options data (expirations, chains, implied vol)
//! - Cache (TTL key-value for derived facts)
//! - Memo sink (reviewable trade artifacts)

pub mod cache;
pub mod market_data;
pub mod memo;
pub mod mocks;
pub mod options_data;

pub use cache::{daily_key, CachePort, InMemoryCache};
pub use market_data::{HistoricalQuery, Interval, MarketDataError, MarketDataPort};
pub use memo::{MemoContext, MemoError, MemoSink};
pub use options_data::{OptionChain, OptionsDataError, OptionsDataPort};
