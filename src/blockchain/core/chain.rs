use crate::blockchain::core::block::Block;
use crate::blockchain::core::validation::verify_chain;
use crate::error::ChainError;
use crate::persistence::{decode_chain, encode_chain, JsonFilePersistence, Persistence};
use std::path::PathBuf;
use tracing::{debug, info};

/// An append-only chain of blocks mirrored to a persistence backend after
/// every mutation.
///
/// The chain is never empty: opening a backend with no stored document
/// writes a genesis block first.
pub struct Blockchain {
    blocks: Vec<Block>,
    persistence: Box<dyn Persistence>,
}

impl Blockchain {
    /// Open (or create) the JSON chain file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ChainError> {
        Self::with_persistence(Box::new(JsonFilePersistence::new(path)))
    }

    /// Open the chain held by `persistence`, bootstrapping a genesis block
    /// when it holds nothing yet.
    pub fn with_persistence(persistence: Box<dyn Persistence>) -> Result<Self, ChainError> {
        let location = persistence.location();

        let document = match persistence.load()? {
            Some(document) => document,
            None => {
                let genesis = Block::genesis();
                info!("No chain at {}; creating genesis block {}", location, genesis.hash_id());
                let document = encode_chain(std::slice::from_ref(&genesis))?;
                persistence.store(&document)?;
                document
            }
        };

        let blocks = decode_chain(&location, &document)?;
        info!("Loaded {} block(s) from {}", blocks.len(), location);

        Ok(Blockchain { blocks, persistence })
    }

    /// Append a block carrying `transaction` and `proof_of_work`.
    ///
    /// The block is pushed, then the extended chain is stored; if the store
    /// fails the push is rolled back, so both sides stay unchanged.
    pub fn add(&mut self, transaction: &str, proof_of_work: &str) -> Result<&Block, ChainError> {
        let block = Block::unsealed(self.next_index()?, proof_of_work, transaction).seal(self.last_block());

        self.blocks.push(block);
        if let Err(e) = self.persist() {
            self.blocks.pop();
            return Err(e);
        }

        let block = self.last_block();
        debug!("Appended block {} ({})", block.index(), block.hash_id());
        Ok(block)
    }

    /// Check the integrity of the whole chain. Never mutates it.
    pub fn verify(&self) -> Result<(), ChainError> {
        verify_chain(&self.blocks)
    }

    /// Write the full chain to the backend.
    pub fn persist(&self) -> Result<(), ChainError> {
        let document = encode_chain(&self.blocks)?;
        self.persistence.store(&document)
    }

    pub fn get_by_index(&self, index: u64) -> Result<&Block, ChainError> {
        let direct = usize::try_from(index).ok().and_then(|i| self.blocks.get(i));
        direct
            .filter(|block| block.index() == index)
            .or_else(|| self.blocks.iter().find(|block| block.index() == index))
            .ok_or_else(|| ChainError::BlockNotFound(format!("Could not find the block with the index of {}", index)))
    }

    pub fn get_by_id(&self, hash_id: &str) -> Result<&Block, ChainError> {
        self.blocks
            .iter()
            .find(|block| block.hash_id() == hash_id)
            .ok_or_else(|| ChainError::BlockNotFound(format!("Could not find the block with the hash id of {}", hash_id)))
    }

    pub fn last_block(&self) -> &Block {
        // Never empty: genesis is written on open and decode rejects empty documents.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn last_index(&self) -> u64 {
        self.last_block().index()
    }

    /// Fails when the last stored index is already `u64::MAX`.
    pub fn next_index(&self) -> Result<u64, ChainError> {
        self.last_index().checked_add(1).ok_or_else(|| ChainError::CorruptChain {
            path: self.location(),
            reason: format!("last index {} leaves no room for another block", self.last_index()),
        })
    }

    /// All blocks in chain order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    // Companion to `len`; always false once opened.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Where the backend keeps the chain.
    pub fn location(&self) -> String {
        self.persistence.location()
    }
}
