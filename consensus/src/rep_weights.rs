//! Cached representative weights, updated incrementally as the ledger
//! applies blocks that move delegated balance between representatives.
//!
//! Avoids scanning all accounts to compute a representative's total delegated
//! weight. The cache is rebuilt once at node startup from the full account set,
//! then maintained incrementally in the same transaction that writes the
//! causing block.
//!
//! Weight equals delegated account balance (u128), matching a Nano-style
//! balance-weighted ORV scheme.

use bln_types::Account;
use std::collections::HashMap;

/// Cached representative weights, updated incrementally on change/state blocks.
pub struct RepWeightCache {
    /// representative_address → total delegated balance.
    weights: HashMap<Account, u128>,
    /// Total weight across all representatives.
    total_weight: u128,
    /// Static snapshot returned in place of live weights while the ledger
    /// is below `bootstrap_weight_max_blocks`.
    bootstrap_weights: Option<HashMap<Account, u128>>,
}

impl RepWeightCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            weights: HashMap::new(),
            total_weight: 0,
            bootstrap_weights: None,
        }
    }

    /// Install a static bootstrap snapshot (e.g. the network's well-known
    /// genesis weight distribution), consulted by [`Self::weight_at`] while
    /// the chain is still short.
    pub fn set_bootstrap_weights(&mut self, weights: HashMap<Account, u128>) {
        self.bootstrap_weights = Some(weights);
    }

    /// Weight for `rep`, preferring the bootstrap snapshot while
    /// `block_count < bootstrap_weight_max_blocks`.
    pub fn weight_at(&self, rep: &Account, block_count: u64, bootstrap_weight_max_blocks: u64) -> u128 {
        if block_count < bootstrap_weight_max_blocks {
            if let Some(snapshot) = &self.bootstrap_weights {
                return snapshot.get(rep).copied().unwrap_or(0);
            }
        }
        self.weight(rep)
    }

    /// Add weight to a representative (when an account delegates to them).
    pub fn add_weight(&mut self, rep: &Account, weight: u128) {
        let entry = self.weights.entry(rep.clone()).or_insert(0);
        *entry = entry.saturating_add(weight);
        self.total_weight = self.total_weight.saturating_add(weight);
    }

    /// Remove weight from a representative (when an account changes rep).
    pub fn remove_weight(&mut self, rep: &Account, weight: u128) {
        if let Some(entry) = self.weights.get_mut(rep) {
            let removed = weight.min(*entry);
            *entry -= removed;
            self.total_weight = self.total_weight.saturating_sub(removed);
            if *entry == 0 {
                self.weights.remove(rep);
            }
        }
    }

    /// Process a ChangeRepresentative: remove weight from old rep, add to new rep.
    pub fn change_rep(&mut self, old_rep: &Account, new_rep: &Account, weight: u128) {
        self.remove_weight(old_rep, weight);
        self.add_weight(new_rep, weight);
    }

    /// Get a representative's current weight. Returns 0 if not found.
    pub fn weight(&self, rep: &Account) -> u128 {
        self.weights.get(rep).copied().unwrap_or(0)
    }

    /// Total weight across all representatives.
    pub fn total_weight(&self) -> u128 {
        self.total_weight
    }

    /// Get all representatives with their weights.
    pub fn all_weights(&self) -> &HashMap<Account, u128> {
        &self.weights
    }

    /// Number of representatives in the cache.
    pub fn rep_count(&self) -> usize {
        self.weights.len()
    }

    /// Rebuild cache from a full account iterator.
    ///
    /// Called once during node startup. Each item yields
    /// `(account_address, representative_address, balance)` — every
    /// account's balance is delegated to its representative.
    pub fn rebuild_from_accounts(
        &mut self,
        accounts: impl Iterator<Item = (Account, Account, u128)>,
    ) {
        self.weights.clear();
        self.total_weight = 0;
        for (_account, rep, balance) in accounts {
            *self.weights.entry(rep).or_insert(0) += balance;
            self.total_weight = self.total_weight.saturating_add(balance);
        }
    }
}

impl Default for RepWeightCache {
    fn default() -> Self {
        Self::new()
    }
}
