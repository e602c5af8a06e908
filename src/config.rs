use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::store::LedgerStore;
use crate::valuation::DEFAULT_USD_KRW_RATE;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

fn default_fallback_rate() -> f64 {
    DEFAULT_USD_KRW_RATE
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    /// Where the ledger file lives; defaults to the platform data dir.
    pub ledger_path: Option<PathBuf>,
    pub providers: ProvidersConfig,
    /// USD→KRW rate used when the live fetch fails.
    pub fallback_exchange_rate: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            ledger_path: None,
            providers: ProvidersConfig::default(),
            fallback_exchange_rate: default_fallback_rate(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location; a missing file is the
    /// default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "nwt", "nwt")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Resolves the ledger file location: explicit override first, then the
    /// configured path, then the platform default.
    pub fn resolve_ledger_path(&self, override_path: Option<&str>) -> Result<PathBuf> {
        if let Some(path) = override_path {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.ledger_path {
            return Ok(path.clone());
        }
        LedgerStore::default_path()
    }

    pub fn yahoo_base_url(&self) -> &str {
        self.providers
            .yahoo
            .as_ref()
            .map_or("https://query1.finance.yahoo.com", |p| &p.base_url)
    }
}
