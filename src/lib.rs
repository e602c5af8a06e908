pub mod cache;
pub mod cli;
pub mod config;
pub mod currency_provider;
pub mod ledger;
pub mod log;
pub mod price_provider;
pub mod providers;
pub mod store;
pub mod summary;
pub mod valuation;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::price_provider::PriceResult;
use crate::providers::yahoo_finance::{YahooCurrencyProvider, YahooFinanceProvider};
use crate::store::LedgerStore;
use crate::valuation::Valuation;

pub use cli::Command;
pub use ledger::{Ledger, LedgerError};

pub async fn run_command(
    command: Command,
    config_path: Option<&str>,
    ledger_path: Option<&str>,
) -> Result<()> {
    info!("Net Worth Tracker starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = LedgerStore::new(config.resolve_ledger_path(ledger_path)?);

    // Create shared caches
    let price_cache = Arc::new(cache::Cache::<String, PriceResult>::new());
    let rate_cache = Arc::new(cache::Cache::<String, f64>::new());

    let base_url = config.yahoo_base_url();
    let price_provider = YahooFinanceProvider::new(base_url, Arc::clone(&price_cache));
    let currency_provider = YahooCurrencyProvider::new(base_url, Arc::clone(&rate_cache));
    let valuation = Valuation::new(
        &price_provider,
        &currency_provider,
        config.fallback_exchange_rate,
    );

    match command {
        Command::Setup => cli::setup::setup(),
        Command::Summary => cli::summary::run(&store, &valuation).await,
        Command::Liquid { op } => cli::liquid::run(&store, op),
        Command::Rd { op } => cli::receivables::run(&store, op),
        Command::Stocks { op } => cli::stocks::run(&store, &valuation, op).await,
        Command::Crypto { op } => cli::crypto::run(&store, op),
    }
}
