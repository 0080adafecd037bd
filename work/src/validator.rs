//! PoW validation.

use bln_crypto::blake2b_256;
use bln_types::BlockHash;

/// Validate that a work nonce meets the minimum difficulty for a given block.
pub fn validate_work(block_hash: &BlockHash, nonce: u64, min_difficulty: u64) -> bool {
    // Same logic as generator check: concatenate block_hash + nonce LE bytes,
    // hash with Blake2b-256, interpret first 8 bytes as u64 LE, compare >= min_difficulty
    let mut input = [0u8; 40];
    input[0..32].copy_from_slice(block_hash.as_bytes());
    input[32..40].copy_from_slice(&nonce.to_le_bytes());
    
    let hash = blake2b_256(&input);
    let work_value = u64::from_le_bytes([
        hash[0], hash[1], hash[2], hash[3],
        hash[4], hash[5], hash[6], hash[7],
    ]);
    
    work_value >= min_difficulty
}
