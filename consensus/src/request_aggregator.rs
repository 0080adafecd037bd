//! Request aggregator — batches inbound vote requests to minimize vote generation.
//!
//! When multiple peers request votes for the same block, the aggregator
//! batches them so we only generate one vote and send copies to all requesters.
//! This is critical for performance under high load.

use bln_types::BlockHash;
use std::collections::{HashMap, VecDeque};

/// Aggregates inbound vote requests to minimize vote generation.
///
/// When multiple peers request votes for the same block, the aggregator
/// batches them so we only generate one vote and send copies to all requesters.
pub struct RequestAggregator {
    /// Pending requests: block_hash -> list of requesting peer IDs
    pending: HashMap<BlockHash, Vec<String>>,
    /// Processing order (FIFO)
    queue: VecDeque<BlockHash>,
    /// Maximum pending requests
    max_pending: usize,
    /// Batch size for processing
    batch_size: usize,
}

impl RequestAggregator {
    /// Create a new request aggregator.
    ///
    /// # Arguments
    /// - `max_pending` — maximum number of distinct block hashes that can be queued
    /// - `batch_size` — number of items to dequeue per `next_batch` call
    pub fn new(max_pending: usize, batch_size: usize) -> Self {
        Self {
            pending: HashMap::new(),
            queue: VecDeque::new(),
            max_pending,
            batch_size,
        }
    }

    /// Add a vote request from a peer.
    ///
    /// If the block hash is already pending, the peer is added to the list of
    /// requesters. If at capacity and the block hash is new, the request is dropped.
    pub fn add_request(&mut self, block_hash: BlockHash, peer_id: String) {
        if self.pending.len() >= self.max_pending && !self.pending.contains_key(&block_hash) {
            return; // Drop if at capacity
        }
        let entry = self.pending.entry(block_hash).or_insert_with(|| {
            self.queue.push_back(block_hash);
            Vec::new()
        });
        if !entry.contains(&peer_id) {
            entry.push(peer_id);
        }
    }

    /// Get the next batch of requests to process.
    /// Returns `(block_hash, requesting_peer_ids)` pairs.
    ///
    /// Items are dequeued in FIFO order, up to `batch_size` items.
    pub fn next_batch(&mut self) -> Vec<(BlockHash, Vec<String>)> {
        let count = self.batch_size.min(self.queue.len());
        let mut batch = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(hash) = self.queue.pop_front() {
                if let Some(peers) = self.pending.remove(&hash) {
                    batch.push((hash, peers));
                }
            }
        }
        batch
    }

    /// Number of pending request entries (distinct block hashes).
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether there are requests waiting to be processed.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }
}
