//! Configuration management for chainfile

use crate::error::ChainError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "chainfile.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_chain_path")]
    pub path: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            path: default_chain_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_demo_transactions")]
    pub transactions: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            transactions: default_demo_transactions(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_chain_path() -> String {
    "chain.json".to_string()
}

fn default_demo_transactions() -> usize {
    11
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Parse configuration from TOML text and validate it.
pub fn parse_config(config_str: &str) -> Result<Config, ChainError> {
    let config: Config = toml::from_str(config_str).map_err(|e| ChainError::ConfigError(e.to_string()))?;

    if config.chain.path.trim().is_empty() {
        return Err(ChainError::ConfigError("chain.path must not be empty".to_string()));
    }

    Ok(config)
}

/// Load configuration from `path`, falling back to defaults when the file is absent.
pub fn load_config_from(path: &Path) -> Result<Config, ChainError> {
    match fs::read_to_string(path) {
        Ok(config_str) => parse_config(&config_str),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(ChainError::ConfigError(format!("Failed to read {}: {}", path.display(), e))),
    }
}

/// Load `chainfile.toml` from the working directory.
pub fn load_config() -> Result<Config, ChainError> {
    load_config_from(Path::new(DEFAULT_CONFIG_FILE))
}
