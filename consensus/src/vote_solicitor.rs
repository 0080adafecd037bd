//! Vote solicitation — actively request representatives to vote on elections.
//!
//! When an election starts, the node should not passively wait for votes. This
//! module tracks which elections need solicitation, which reps have already
//! responded, and enforces a re-solicitation interval with a maximum retry count.

use bln_types::{BlockHash, Account};
use std::collections::{HashMap, HashSet};

/// Per-election solicitation state.
struct SolicitationState {
    /// The block hash we're asking representatives to vote on.
    block_hash: BlockHash,
    /// UNIX timestamp (seconds) of the last solicitation round.
    last_solicited: u64,
    /// How many solicitation rounds have been sent.
    solicitation_count: u32,
    /// Maximum number of solicitation rounds before giving up.
    max_solicitations: u32,
    /// Representatives that have already responded with a vote.
    responded_reps: HashSet<Account>,
}

/// Tracks which elections need vote solicitation and when to re-request.
pub struct VoteSolicitor {
    /// Elections that need votes: election_root → solicitation state.
    pending: HashMap<BlockHash, SolicitationState>,
    /// Minimum interval between re-solicitations (seconds).
    interval_secs: u64,
}

impl VoteSolicitor {
    /// Create a new solicitor with the given re-solicitation interval.
    pub fn new(interval_secs: u64) -> Self {
        Self {
            pending: HashMap::new(),
            interval_secs,
        }
    }

    /// Register an election that needs vote solicitation.
    ///
    /// `root` is the election root (e.g. the `previous` hash of forking blocks).
    /// `block_hash` is the specific block we're asking reps to vote on.
    pub fn add_election(&mut self, root: BlockHash, block_hash: BlockHash) {
        self.pending.entry(root).or_insert_with(|| SolicitationState {
            block_hash,
            last_solicited: 0,
            solicitation_count: 0,
            max_solicitations: 10,
            responded_reps: HashSet::new(),
        });
    }

    /// Register an election with custom max solicitations.
    pub fn add_election_with_max(
        &mut self,
        root: BlockHash,
        block_hash: BlockHash,
        max_solicitations: u32,
    ) {
        self.pending.entry(root).or_insert_with(|| SolicitationState {
            block_hash,
            last_solicited: 0,
            solicitation_count: 0,
            max_solicitations,
            responded_reps: HashSet::new(),
        });
    }

    /// Remove an election (confirmed or expired).
    pub fn remove_election(&mut self, root: &BlockHash) {
        self.pending.remove(root);
    }

    /// Record that a representative has voted (don't re-solicit them).
    pub fn record_vote(&mut self, root: &BlockHash, rep: &Account) {
        if let Some(state) = self.pending.get_mut(root) {
            state.responded_reps.insert(rep.clone());
        }
    }

    /// Get elections that need solicitation at the current time.
    ///
    /// Returns a list of `(block_hash, target_reps)` for each election
    /// that hasn't been solicited recently and hasn't exceeded its retry limit.
    /// `target_reps` excludes representatives that have already responded.
    pub fn elections_needing_solicitation(
        &mut self,
        now: u64,
        all_reps: &[Account],
    ) -> Vec<(BlockHash, Vec<Account>)> {
        let interval = self.interval_secs;
        let mut results = Vec::new();

        for state in self.pending.values_mut() {
            // Skip if we've exceeded max solicitations
            if state.solicitation_count >= state.max_solicitations {
                continue;
            }

            // Skip if not enough time has elapsed since last solicitation
            if state.last_solicited > 0 && now.saturating_sub(state.last_solicited) < interval {
                continue;
            }

            // Determine which reps haven't responded yet
            let target_reps: Vec<Account> = all_reps
                .iter()
                .filter(|r| !state.responded_reps.contains(r))
                .cloned()
                .collect();

            if !target_reps.is_empty() {
                state.last_solicited = now;
                state.solicitation_count += 1;
                results.push((state.block_hash, target_reps));
            }
        }

        results
    }

    /// Number of active solicitations.
    pub fn active_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if an election is being solicited.
    pub fn contains(&self, root: &BlockHash) -> bool {
        self.pending.contains_key(root)
    }

    /// How many reps have responded for a given election.
    pub fn responded_count(&self, root: &BlockHash) -> usize {
        self.pending
            .get(root)
            .map(|s| s.responded_reps.len())
            .unwrap_or(0)
    }

    /// How many solicitation rounds have been sent for a given election.
    pub fn solicitation_count(&self, root: &BlockHash) -> u32 {
        self.pending
            .get(root)
            .map(|s| s.solicitation_count)
            .unwrap_or(0)
    }

    /// Remove elections that have exceeded their max solicitations.
    /// Returns the roots of pruned elections.
    pub fn prune_exhausted(&mut self) -> Vec<BlockHash> {
        let exhausted: Vec<BlockHash> = self
            .pending
            .iter()
            .filter(|(_, s)| s.solicitation_count >= s.max_solicitations)
            .map(|(root, _)| *root)
            .collect();

        for root in &exhausted {
            self.pending.remove(root);
        }

        exhausted
    }
}
