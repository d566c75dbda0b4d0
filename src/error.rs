//! Error types for chainfile

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("{0} Unknown property")]
    UnknownField(String),
    #[error("The file \"{path}\" is not a valid chain document: {reason}")]
    CorruptChain { path: String, reason: String },
    #[error("Block not found: {0}")]
    BlockNotFound(String),
    #[error("Verification Failed Record Index: {index}")]
    Integrity { index: u64 },
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ChainError {
    /// Index of the first block that failed verification, if this is an
    /// integrity error.
    pub fn integrity_index(&self) -> Option<u64> {
        match self {
            ChainError::Integrity { index } => Some(*index),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::SerializationError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
