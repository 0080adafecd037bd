//! Election state machine — manages the lifecycle of a single consensus
//! election, keyed by `qualified_root`.
//!
//! A block's qualified root is its `previous` hash (or the account itself,
//! for an open block) — the identifier of the conflict set a fork or a
//! confirmation race resolves. Representatives vote on candidate blocks
//! sharing that root; a block is confirmed once it accumulates weight past
//! the online-quorum delta.

use crate::vote_info::{VoteInfo, VoteResult};
use bln_types::{Account, BlockHash, QualifiedRoot, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum number of competing candidate blocks tracked per election.
pub const MAX_BLOCKS: usize = 10;

/// Per-voter acceptance cooldown, in seconds. Decided at 20s
/// (`ELECTION_VOTE_COOLDOWN_SECS`); see DESIGN.md.
pub const ELECTION_VOTE_COOLDOWN_SECS: u64 = 20;

/// Whether an election was started for an ordinary fork/publish, or
/// opportunistically to push a quiet frontier toward confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionBehavior {
    Normal,
    Optimistic,
}

/// The lifecycle state of an election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionState {
    /// Created, waiting for its activation timer.
    Passive,
    /// Past the activation timer; has not yet generated its own vote.
    Active,
    /// Generated a local vote and is soliciting others.
    Broadcasting,
    /// Reached quorum. Terminal state.
    Confirmed,
    /// TTL elapsed without reaching confirmation. Terminal state.
    ExpiredUnconfirmed,
}

/// Summary of a confirmed (or expired) election.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElectionStatus {
    pub qualified_root: QualifiedRoot,
    pub winner: BlockHash,
    pub tally: u128,
    pub final_tally: u128,
    pub voter_count: usize,
    pub election_duration_ms: u64,
}

/// A single consensus election for a qualified root.
///
/// Tracks candidate blocks and votes from representatives, and determines
/// when one candidate reaches the confirmation threshold.
#[derive(Clone, Debug)]
pub struct Election {
    pub qualified_root: QualifiedRoot,
    pub state: ElectionState,
    pub behavior: ElectionBehavior,
    /// Candidate blocks sharing this root, bounded to [`MAX_BLOCKS`].
    /// Value is the raw serialized block, kept only for rebroadcast.
    candidates: HashMap<BlockHash, Vec<u8>>,
    /// Latest vote per representative.
    last_votes: HashMap<Account, VoteInfo>,
    /// Per-block weight tally (non-final votes).
    tally: HashMap<BlockHash, u128>,
    /// Per-block weight tally restricted to final votes.
    final_tally: HashMap<BlockHash, u128>,
    pub created_at: Timestamp,
    pub state_changed_at: Timestamp,
    /// Weight needed to confirm: the online-quorum delta, computed by the
    /// caller from current online weight and handed in at construction.
    quorum_delta: u128,
    cooldown_secs: u64,
}

impl Election {
    /// Create a new election in the Passive state for `qualified_root`,
    /// with an initial candidate block (its hash and serialized bytes).
    pub fn new(
        qualified_root: QualifiedRoot,
        initial_candidate: BlockHash,
        initial_bytes: Vec<u8>,
        behavior: ElectionBehavior,
        quorum_delta: u128,
        now: Timestamp,
    ) -> Self {
        let mut candidates = HashMap::new();
        candidates.insert(initial_candidate, initial_bytes);

        Self {
            qualified_root,
            state: ElectionState::Passive,
            behavior,
            candidates,
            last_votes: HashMap::new(),
            tally: HashMap::new(),
            final_tally: HashMap::new(),
            created_at: now,
            state_changed_at: now,
            quorum_delta,
            cooldown_secs: ELECTION_VOTE_COOLDOWN_SECS,
        }
    }

    #[cfg(test)]
    fn with_cooldown(mut self, secs: u64) -> Self {
        self.cooldown_secs = secs;
        self
    }

    /// Add a competing candidate block. If the election is already at
    /// [`MAX_BLOCKS`], evicts the candidate with the smallest supporting
    /// weight — provided that weight is strictly less than the incoming
    /// block's own support (0 for a brand-new block with no prior votes).
    ///
    /// Returns `true` if the block was admitted.
    pub fn publish(&mut self, hash: BlockHash, bytes: Vec<u8>) -> bool {
        if self.candidates.contains_key(&hash) {
            return true;
        }
        if self.candidates.len() < MAX_BLOCKS {
            self.candidates.insert(hash, bytes);
            return true;
        }

        let weakest = self
            .candidates
            .keys()
            .min_by_key(|h| self.total_weight(h))
            .copied();

        let incoming_weight = self.total_weight(&hash);
        if let Some(weakest) = weakest {
            if self.total_weight(&weakest) < incoming_weight {
                self.candidates.remove(&weakest);
                self.tally.remove(&weakest);
                self.final_tally.remove(&weakest);
                self.candidates.insert(hash, bytes);
                return true;
            }
        }
        false
    }

    fn total_weight(&self, hash: &BlockHash) -> u128 {
        self.tally.get(hash).copied().unwrap_or(0)
            + self.final_tally.get(hash).copied().unwrap_or(0)
    }

    pub fn candidate_hashes(&self) -> impl Iterator<Item = &BlockHash> {
        self.candidates.keys()
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Process a vote from a representative.
    ///
    /// Acceptance predicate: the vote is accepted if its timestamp is
    /// strictly newer than the voter's last recorded one, OR the timestamp
    /// ties but the new hash carries more weight (final-vote upgrade path),
    /// OR at least `cooldown` seconds have elapsed since the voter's last
    /// vote. Anything else is a replay and is ignored.
    pub fn vote(
        &mut self,
        voter: &Account,
        block: BlockHash,
        weight: u128,
        is_final: bool,
        now: Timestamp,
    ) -> VoteResult {
        if matches!(
            self.state,
            ElectionState::Confirmed | ElectionState::ExpiredUnconfirmed
        ) {
            return VoteResult::Ignored;
        }
        if weight == 0 {
            return VoteResult::Ignored;
        }

        if let Some(existing) = self.last_votes.get(voter) {
            if existing.is_final {
                return VoteResult::Error(format!(
                    "final vote already cast by {}",
                    voter.as_str()
                ));
            }

            let newer = now.as_secs() > existing.timestamp.as_secs();
            let tied_heavier = now.as_secs() == existing.timestamp.as_secs() && is_final;
            let cooled_down = now
                .as_secs()
                .saturating_sub(existing.timestamp.as_secs())
                >= self.cooldown_secs;

            if !(newer || tied_heavier || cooled_down) {
                return VoteResult::Ignored;
            }

            let old_block = existing.block_hash;
            let old_weight = existing.weight;
            let old_final = existing.is_final;
            self.subtract_tally(old_block, old_weight, old_final);

            let new_sequence = existing.sequence + 1;
            let info = VoteInfo::new(voter.clone(), block, weight, is_final, now, new_sequence);
            self.last_votes.insert(voter.clone(), info);
            self.add_tally(block, weight, is_final);
            self.advance_to_active(now);

            VoteResult::Updated
        } else {
            let info = VoteInfo::new(voter.clone(), block, weight, is_final, now, 1);
            self.last_votes.insert(voter.clone(), info);
            self.add_tally(block, weight, is_final);
            self.advance_to_active(now);

            VoteResult::Accepted
        }
    }

    fn add_tally(&mut self, block: BlockHash, weight: u128, is_final: bool) {
        *self.tally.entry(block).or_insert(0) += weight;
        if is_final {
            *self.final_tally.entry(block).or_insert(0) += weight;
        }
    }

    fn subtract_tally(&mut self, block: BlockHash, weight: u128, was_final: bool) {
        if let Some(w) = self.tally.get_mut(&block) {
            *w = w.saturating_sub(weight);
            if *w == 0 {
                self.tally.remove(&block);
            }
        }
        if was_final {
            if let Some(w) = self.final_tally.get_mut(&block) {
                *w = w.saturating_sub(weight);
                if *w == 0 {
                    self.final_tally.remove(&block);
                }
            }
        }
    }

    fn advance_to_active(&mut self, now: Timestamp) {
        if self.state == ElectionState::Passive {
            self.state = ElectionState::Active;
            self.state_changed_at = now;
        }
    }

    /// Move the election from Active to Broadcasting once it has generated
    /// its own local vote.
    pub fn start_broadcasting(&mut self, now: Timestamp) {
        if self.state == ElectionState::Active {
            self.state = ElectionState::Broadcasting;
            self.state_changed_at = now;
        }
    }

    /// Check whether the current winner has reached quorum, either via its
    /// regular tally or via final-vote weight alone. If so, transitions to
    /// Confirmed and returns the status.
    pub fn try_confirm(&mut self, now: Timestamp) -> Option<ElectionStatus> {
        if matches!(
            self.state,
            ElectionState::Confirmed | ElectionState::ExpiredUnconfirmed
        ) {
            return None;
        }

        let (winner, winner_tally) = self.leading_block()?;
        let final_tally = self.final_tally.get(&winner).copied().unwrap_or(0);

        if winner_tally >= self.quorum_delta || final_tally >= self.quorum_delta {
            self.state = ElectionState::Confirmed;
            self.state_changed_at = now;

            let duration_ms = now
                .as_secs()
                .saturating_sub(self.created_at.as_secs())
                .saturating_mul(1000);

            Some(ElectionStatus {
                qualified_root: self.qualified_root,
                winner,
                tally: winner_tally,
                final_tally,
                voter_count: self.last_votes.len(),
                election_duration_ms: duration_ms,
            })
        } else {
            None
        }
    }

    /// Advance the election's timers. Returns `true` when the caller should
    /// remove this election from its container (it reached a terminal
    /// state this call, or already had).
    pub fn transition_time(&mut self, ttl_ms: u64, now: Timestamp) -> bool {
        if matches!(
            self.state,
            ElectionState::Confirmed | ElectionState::ExpiredUnconfirmed
        ) {
            return true;
        }

        if self.try_confirm(now).is_some() {
            return true;
        }

        let elapsed_ms = now
            .as_secs()
            .saturating_sub(self.created_at.as_secs())
            .saturating_mul(1000);

        if elapsed_ms >= ttl_ms {
            self.state = ElectionState::ExpiredUnconfirmed;
            self.state_changed_at = now;
            true
        } else {
            false
        }
    }

    /// Test/admin path: cement the current leader immediately, bypassing
    /// quorum.
    pub fn force_confirm(&mut self, now: Timestamp) -> Option<ElectionStatus> {
        let (winner, winner_tally) = self.leading_block()?;
        self.state = ElectionState::Confirmed;
        self.state_changed_at = now;
        let final_tally = self.final_tally.get(&winner).copied().unwrap_or(0);
        let duration_ms = now
            .as_secs()
            .saturating_sub(self.created_at.as_secs())
            .saturating_mul(1000);
        Some(ElectionStatus {
            qualified_root: self.qualified_root,
            winner,
            tally: winner_tally,
            final_tally,
            voter_count: self.last_votes.len(),
            election_duration_ms: duration_ms,
        })
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == ElectionState::Confirmed
    }

    pub fn is_expired(&self) -> bool {
        self.state == ElectionState::ExpiredUnconfirmed
    }

    /// Returns the candidate with the most voting weight (tally + final
    /// tally), ties broken by hash ordering.
    pub fn leading_block(&self) -> Option<(BlockHash, u128)> {
        self.candidates.keys().map(|h| (*h, self.total_weight(h))).max_by(
            |(ha, wa), (hb, wb)| wa.cmp(wb).then_with(|| ha.cmp(hb)),
        )
    }

    pub fn quorum_delta(&self) -> u128 {
        self.quorum_delta
    }

    pub fn voter_count(&self) -> usize {
        self.last_votes.len()
    }
}
