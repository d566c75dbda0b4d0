//! Hashing primitives for chainfile

use crate::blockchain::Block;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 digest of arbitrary bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute the hash that links a block carrying `transaction` to `previous`.
///
/// The digest covers, with no separators and in this order: the previous
/// block's hash id, its decimal index, its stored timestamp, and the new
/// block's transaction text. The new block's own index, timestamp and
/// proof-of-work are not part of the digest; existing chain files depend on
/// this exact layout.
pub fn link_hash(transaction: &str, previous: &Block) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous.hash_id().as_bytes());
    hasher.update(previous.index().to_string().as_bytes());
    hasher.update(previous.timestamp().as_bytes());
    hasher.update(transaction.as_bytes());
    hex::encode(hasher.finalize())
}
