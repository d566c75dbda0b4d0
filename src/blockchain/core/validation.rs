use crate::blockchain::core::block::Block;
use crate::crypto::link_hash;
use crate::error::ChainError;
use tracing::warn;

/// Check every block against its stored predecessor, in position order.
///
/// The block at position `p` must carry index `p` and a hash id equal to the
/// link hash of its transaction over the block at `p - 1`. Genesis is checked
/// against the unsealed genesis template stamped with the stored genesis
/// timestamp. Stops at the first failing position.
pub fn verify_chain(blocks: &[Block]) -> Result<(), ChainError> {
    for (position, block) in blocks.iter().enumerate() {
        let index = position as u64;

        if block.index() != index {
            warn!("Block at position {} carries index {}", position, block.index());
            return Err(ChainError::Integrity { index });
        }

        let expected = match position {
            0 => {
                let template = Block::genesis_template(Some(block.timestamp().to_string()));
                link_hash(block.transaction(), &template)
            }
            _ => link_hash(block.transaction(), &blocks[position - 1]),
        };

        if expected != block.hash_id() {
            warn!(
                "Hash mismatch at index {}: expected {}, stored {}",
                index,
                expected,
                block.hash_id()
            );
            return Err(ChainError::Integrity { index });
        }
    }
    Ok(())
}
