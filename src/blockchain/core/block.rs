use crate::crypto::link_hash;
use crate::error::ChainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Layout of block timestamps, e.g. `Fri, 16 Oct 2026 09:04:05 GMT`.
pub const TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub const GENESIS_TRANSACTION: &str = "init";
pub const GENESIS_PROOF_OF_WORK: &str = "First Block";

/// Current UTC time in [`TIMESTAMP_FORMAT`].
pub fn current_timestamp() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// A single record of the chain.
///
/// Field order here is the key order of the stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    timestamp: String,
    #[serde(rename = "proof-of-work")]
    proof_of_work: String,
    transaction: String,
    #[serde(rename = "hashid")]
    hash_id: String,
}

impl Block {
    /// Build a block from its five fields. A missing timestamp is filled with
    /// the current time; a supplied one is kept verbatim.
    pub fn new(
        index: u64,
        timestamp: Option<String>,
        proof_of_work: impl Into<String>,
        transaction: impl Into<String>,
        hash_id: impl Into<String>,
    ) -> Self {
        Block {
            index,
            timestamp: timestamp.unwrap_or_else(current_timestamp),
            proof_of_work: proof_of_work.into(),
            transaction: transaction.into(),
            hash_id: hash_id.into(),
        }
    }

    /// A freshly stamped block whose hash id is still empty.
    pub fn unsealed(index: u64, proof_of_work: impl Into<String>, transaction: impl Into<String>) -> Self {
        Block::new(index, None, proof_of_work, transaction, String::new())
    }

    /// The unsealed genesis template stamped with `timestamp`.
    pub fn genesis_template(timestamp: Option<String>) -> Self {
        Block::new(0, timestamp, GENESIS_PROOF_OF_WORK, GENESIS_TRANSACTION, String::new())
    }

    /// A sealed genesis block: its hash links it to its own unsealed template.
    pub fn genesis() -> Self {
        let template = Block::genesis_template(None);
        template.clone().seal(&template)
    }

    /// Fix the hash id against `previous`. A block that already carries a
    /// hash id is returned unchanged.
    pub fn seal(mut self, previous: &Block) -> Self {
        if self.hash_id.is_empty() {
            self.hash_id = link_hash(&self.transaction, previous);
        }
        self
    }

    pub fn is_sealed(&self) -> bool {
        !self.hash_id.is_empty()
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn proof_of_work(&self) -> &str {
        &self.proof_of_work
    }

    pub fn transaction(&self) -> &str {
        &self.transaction
    }

    pub fn hash_id(&self) -> &str {
        &self.hash_id
    }

    /// Textual value of a named field.
    pub fn field(&self, field: BlockField) -> String {
        match field {
            BlockField::Index => self.index.to_string(),
            BlockField::Timestamp => self.timestamp.clone(),
            BlockField::ProofOfWork => self.proof_of_work.clone(),
            BlockField::Transaction => self.transaction.clone(),
            BlockField::HashId => self.hash_id.clone(),
        }
    }

    /// Look a field up by its stored name (case-insensitive).
    pub fn get(&self, name: &str) -> Result<String, ChainError> {
        Ok(self.field(name.parse()?))
    }

    /// The block as a plain JSON object with keys in stored order.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "proof-of-work": self.proof_of_work,
            "transaction": self.transaction,
            "hashid": self.hash_id,
        })
    }
}

/// The five recognised block fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockField {
    Index,
    Timestamp,
    ProofOfWork,
    Transaction,
    HashId,
}

impl BlockField {
    pub const ALL: [BlockField; 5] = [
        BlockField::Index,
        BlockField::Timestamp,
        BlockField::ProofOfWork,
        BlockField::Transaction,
        BlockField::HashId,
    ];

    /// Key used for this field in the stored document.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockField::Index => "index",
            BlockField::Timestamp => "timestamp",
            BlockField::ProofOfWork => "proof-of-work",
            BlockField::Transaction => "transaction",
            BlockField::HashId => "hashid",
        }
    }
}

impl fmt::Display for BlockField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockField {
    type Err = ChainError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let lower = name.to_lowercase();
        BlockField::ALL
            .into_iter()
            .find(|field| field.as_str() == lower)
            .ok_or_else(|| ChainError::UnknownField(name.to_string()))
    }
}
