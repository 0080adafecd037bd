//! PoW generation (CPU).

use crate::{WorkError, WorkNonce};
use bln_crypto::blake2b_256;
use bln_types::BlockHash;

/// Generates proof-of-work for a block.
pub struct WorkGenerator;

impl WorkGenerator {
    /// Generate a work nonce that meets the minimum difficulty.
    ///
    /// Iterates nonces until `hash(block_hash || nonce)` meets the threshold.
    /// The block hash portion of the input buffer is hoisted outside the tight
    /// loop since it never changes — only the 8-byte nonce suffix is updated.
    pub fn generate(
        &self,
        block_hash: &BlockHash,
        min_difficulty: u64,
    ) -> Result<WorkNonce, WorkError> {
        let mut input = [0u8; 40];
        input[0..32].copy_from_slice(block_hash.as_bytes());

        for nonce in 0u64.. {
            input[32..40].copy_from_slice(&nonce.to_le_bytes());
            let hash = blake2b_256(&input);
            let work_value = u64::from_le_bytes(hash[0..8].try_into().unwrap());
            if work_value >= min_difficulty {
                return Ok(WorkNonce(nonce));
            }
        }
        Err(WorkError::Cancelled)
    }
}

/// Validation helper used by tests (single-shot, not hot loop).
#[cfg(test)]
fn validate_work_inner(block_hash: &[u8; 32], nonce: u64, min_difficulty: u64) -> bool {
    let mut input = [0u8; 40];
    input[0..32].copy_from_slice(block_hash);
    input[32..40].copy_from_slice(&nonce.to_le_bytes());
    let hash = blake2b_256(&input);
    let work_value = u64::from_le_bytes(hash[0..8].try_into().unwrap());
    work_value >= min_difficulty
}
