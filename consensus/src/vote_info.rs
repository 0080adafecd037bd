//! Vote data — represents a single representative's vote on a block.

use bln_types::{BlockHash, Timestamp, Account};
use serde::{Deserialize, Serialize};

/// The result of processing a vote in an election.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoteResult {
    /// Vote was accepted (new voter, or first vote).
    Accepted,
    /// Vote replaced a previous non-final vote (re-vote).
    Updated,
    /// Vote was ignored (duplicate, or lower sequence, or election already confirmed).
    Ignored,
    /// Vote processing encountered an error.
    Error(String),
}

/// Information about a single vote cast by a representative.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoteInfo {
    /// The representative who cast this vote.
    pub voter: Account,
    /// The block hash being voted for.
    pub block_hash: BlockHash,
    /// Voting weight of this representative.
    pub weight: u128,
    /// Whether this is a final vote (cannot be changed once cast).
    pub is_final: bool,
    /// When the vote was cast.
    pub timestamp: Timestamp,
    /// Monotonically increasing sequence number per voter.
    pub sequence: u64,
}

impl VoteInfo {
    pub fn new(
        voter: Account,
        block_hash: BlockHash,
        weight: u128,
        is_final: bool,
        timestamp: Timestamp,
        sequence: u64,
    ) -> Self {
        Self {
            voter,
            block_hash,
            weight,
            is_final,
            timestamp,
            sequence,
        }
    }
}
