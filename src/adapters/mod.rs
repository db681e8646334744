//! Adapters Layer - External system implementations
//!
//! - REST: quote API client for price and options data
//! - Memo: markdown trade memo writer
//! - CLI: command-line interface definitions

pub mod cli;
pub mod memo;
pub mod rest;

pub use cli::CliApp;
pub use memo::TradeMemoWriter;
pub use rest::{QuoteApiClient, QuoteApiConfig};
