//! Shared helpers for the command-line binaries.

use crate::blockchain::Blockchain;
use crate::config::{load_config, load_config_from, Config};
use crate::error::ChainError;
use crate::logging::{init_logging, LogFormat};
use std::path::{Path, PathBuf};

/// Load configuration from `config_path` (or the default file) and apply a
/// chain path override.
pub fn resolve_config(config_path: Option<&Path>, chain_override: Option<&Path>) -> Result<Config, ChainError> {
    let mut config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(path) = chain_override {
        config.chain.path = path.display().to_string();
    }
    Ok(config)
}

/// Install logging as configured.
pub fn init_logging_from_config(config: &Config) {
    init_logging(&config.logging.level, LogFormat::from_str_lossy(&config.logging.format));
}

pub fn chain_path(config: &Config) -> PathBuf {
    PathBuf::from(&config.chain.path)
}

/// Open the chain file named by the configuration.
pub fn load_blockchain_from_config(config: &Config) -> Result<Blockchain, ChainError> {
    Blockchain::open(chain_path(config))
}

/// Shorten a hash for table output. Counts characters, not bytes.
pub fn short_hash(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() > 16 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 8..].iter().collect();
        format!("{head}...{tail}")
    } else {
        hash.to_string()
    }
}
