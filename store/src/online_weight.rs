//! Online weight sample storage (spec §6.3 `online_weight` table).
//!
//! Representative weight itself (C3) is an in-memory cache rebuilt from the
//! ledger at startup (`bln_consensus::rep_weights`) and is not persisted
//! here; only the periodic online-weight samples used to derive quorum are.

use crate::StoreError;

/// Trait for the persisted online weight sample history.
pub trait OnlineWeightStore {
    /// Record an online weight sample at the given timestamp (unix seconds).
    fn put_online_weight_sample(&self, timestamp: u64, weight: u128) -> Result<(), StoreError>;

    /// Delete the oldest samples so at most `keep` remain.
    fn trim_online_weight_samples(&self, keep: usize) -> Result<(), StoreError>;

    /// Get the most recent online weight samples, up to `limit` entries.
    /// Returned in descending timestamp order (newest first).
    fn get_online_weight_samples(&self, limit: usize) -> Result<Vec<(u64, u128)>, StoreError>;
}
