//! Indexer configuration types

use crate::logs::AmountRendering;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tidemark_core::{Address, Result, TidemarkError, MAX_DECIMALS};

/// Complete indexer configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Event source filters
    #[serde(default)]
    pub indexer: IndexerSettings,

    /// Token metadata
    #[serde(default)]
    pub token: TokenConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl IndexerConfig {
    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TidemarkError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| TidemarkError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.decimals > MAX_DECIMALS {
            return Err(TidemarkError::InvalidConfig(format!(
                "token.decimals must be at most {MAX_DECIMALS}, got {}",
                self.token.decimals
            )));
        }
        if self.token.display_decimals > self.token.decimals {
            return Err(TidemarkError::InvalidConfig(format!(
                "token.display_decimals ({}) exceeds token.decimals ({})",
                self.token.display_decimals, self.token.decimals
            )));
        }
        Ok(())
    }
}

/// Which events to accept
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerSettings {
    /// Only handle events from this chain (mainnet unless set)
    #[serde(default = "default_chain_id")]
    pub chain_id: Option<u64>,

    /// Only handle events emitted by this contract
    #[serde(default)]
    pub contract: Option<Address>,
}

fn default_chain_id() -> Option<u64> {
    Some(1)
}

impl Default for IndexerSettings {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            contract: None,
        }
    }
}

/// Token metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Display symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Token decimals
    #[serde(default = "default_decimals")]
    pub decimals: u32,

    /// Fractional digits in `amount_display`
    #[serde(default = "default_display_decimals")]
    pub display_decimals: u32,
}

fn default_symbol() -> String {
    "WETH".to_string()
}

fn default_decimals() -> u32 {
    tidemark_core::TOKEN_DECIMALS
}

fn default_display_decimals() -> u32 {
    tidemark_core::DISPLAY_DECIMALS
}

impl TokenConfig {
    pub fn rendering(&self) -> AmountRendering {
        AmountRendering {
            decimals: self.decimals,
            places: self.display_decimals,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimals: default_decimals(),
            display_decimals: default_display_decimals(),
        }
    }
}

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: text, json
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
