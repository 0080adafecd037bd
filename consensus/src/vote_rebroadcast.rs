//! Vote rebroadcaster — relays important votes from other representatives.
//! Ensures votes reach all nodes even without direct connections.

use std::collections::HashSet;

/// Maximum recent vote hashes tracked (dedup).
const MAX_RECENT: usize = 65_536;

pub struct VoteRebroadcaster {
    /// Recently seen vote hashes (for dedup).
    recent: HashSet<[u8; 32]>,
    /// FIFO order for eviction.
    recent_order: Vec<[u8; 32]>,
    /// Minimum weight for rebroadcast (only rebroadcast principal rep votes).
    min_weight: u128,
    /// Maximum recent entries.
    max_recent: usize,
}

impl VoteRebroadcaster {
    pub fn new(min_weight: u128) -> Self {
        Self {
            recent: HashSet::new(),
            recent_order: Vec::new(),
            min_weight,
            max_recent: MAX_RECENT,
        }
    }

    /// Check if a vote should be rebroadcast.
    /// Returns true if the vote is from a sufficiently weighted rep
    /// and hasn't been seen recently.
    pub fn should_rebroadcast(&mut self, vote_hash: &[u8; 32], voter_weight: u128) -> bool {
        if voter_weight < self.min_weight {
            return false;
        }
        if self.recent.contains(vote_hash) {
            return false;
        }
        // Add to recent
        if self.recent.len() >= self.max_recent {
            if let Some(oldest) = self.recent_order.first().copied() {
                self.recent.remove(&oldest);
                self.recent_order.remove(0);
            }
        }
        self.recent.insert(*vote_hash);
        self.recent_order.push(*vote_hash);
        true
    }

    /// Number of recently seen votes.
    pub fn recent_count(&self) -> usize {
        self.recent.len()
    }

    /// Clear all state.
    pub fn clear(&mut self) {
        self.recent.clear();
        self.recent_order.clear();
    }
}
