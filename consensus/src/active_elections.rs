//! Active elections container — the top-level coordinator for the ORV
//! election system (C7). Holds a bounded set of concurrent elections,
//! indexed by qualified root and by the hash of every candidate block they
//! hold, and tracks the bookkeeping needed to schedule and retire them.

use crate::election::{Election, ElectionBehavior, ElectionState, ElectionStatus};
use crate::error::ConsensusError;
use crate::vote_info::VoteResult;
use bln_types::{Account, BlockHash, QualifiedRoot, Timestamp};
use std::collections::{HashMap, HashSet, VecDeque};

/// Percentage of online weight a winner must reach to confirm.
const QUORUM_PERCENT: u128 = 67;

fn quorum_delta(online_weight: u128) -> u128 {
    online_weight.saturating_mul(QUORUM_PERCENT) / 100
}

/// Container for all active consensus elections.
pub struct ActiveElections {
    elections: HashMap<QualifiedRoot, Election>,
    /// Insertion order, oldest first — backs `erase_oldest`/`list_active`.
    insertion_order: VecDeque<QualifiedRoot>,
    /// Every candidate block hash currently tracked, mapped to its root.
    block_index: HashMap<BlockHash, QualifiedRoot>,
    max_elections: usize,
    /// Effective online voting weight used to compute new elections' quorum delta.
    online_weight: u128,
    /// Recently confirmed roots, short-circuits votes on settled conflicts.
    recently_confirmed: VecDeque<(QualifiedRoot, BlockHash)>,
    recently_confirmed_cap: usize,
    /// Recently cemented election outcomes, for observers.
    recently_cemented: VecDeque<ElectionStatus>,
    recently_cemented_cap: usize,
    /// Accounts with uncemented blocks, ordered by uncemented count descending.
    priority_cementable_frontiers: Vec<(Account, u64)>,
    /// Accounts whose optimistic election timed out, awaiting pessimistic retry.
    expired_optimistic_elections: HashSet<Account>,
}

impl ActiveElections {
    pub fn new(max_elections: usize, online_weight: u128) -> Self {
        Self {
            elections: HashMap::new(),
            insertion_order: VecDeque::new(),
            block_index: HashMap::new(),
            max_elections,
            online_weight,
            recently_confirmed: VecDeque::new(),
            recently_confirmed_cap: 2048,
            recently_cemented: VecDeque::new(),
            recently_cemented_cap: 2048,
            priority_cementable_frontiers: Vec::new(),
            expired_optimistic_elections: HashSet::new(),
        }
    }

    /// Start a new election for `root`, with `candidate` as its first block.
    ///
    /// Refuses (returns `Ok(false)`) if the root was recently confirmed —
    /// the conflict is already settled. Errors at capacity. A second
    /// `insert` for a root that already has a live election is a no-op
    /// success.
    pub fn insert(
        &mut self,
        root: QualifiedRoot,
        candidate: BlockHash,
        candidate_bytes: Vec<u8>,
        behavior: ElectionBehavior,
        now: Timestamp,
    ) -> Result<bool, ConsensusError> {
        if self.recently_confirmed.iter().any(|(r, _)| *r == root) {
            return Ok(false);
        }
        if self.elections.contains_key(&root) {
            return Ok(true);
        }
        if self.elections.len() >= self.max_elections {
            return Err(ConsensusError::ElectionCapacityReached(self.max_elections));
        }

        let delta = quorum_delta(self.online_weight);
        let election = Election::new(root, candidate, candidate_bytes, behavior, delta, now);
        self.elections.insert(root, election);
        self.insertion_order.push_back(root);
        self.block_index.insert(candidate, root);
        Ok(true)
    }

    /// Add a competing candidate block to an existing election.
    pub fn publish(
        &mut self,
        root: &QualifiedRoot,
        hash: BlockHash,
        bytes: Vec<u8>,
    ) -> Result<bool, ConsensusError> {
        let election = self
            .elections
            .get_mut(root)
            .ok_or_else(|| ConsensusError::ElectionNotFound(format!("{root:?}")))?;
        let admitted = election.publish(hash, bytes);
        if admitted {
            self.block_index.insert(hash, *root);
        }
        Ok(admitted)
    }

    /// Route a vote to the election owning `candidate`'s root.
    pub fn vote(
        &mut self,
        candidate: &BlockHash,
        voter: &Account,
        weight: u128,
        is_final: bool,
        now: Timestamp,
    ) -> Result<Option<ElectionStatus>, ConsensusError> {
        let root = *self
            .block_index
            .get(candidate)
            .ok_or_else(|| ConsensusError::ElectionNotFound(format!("{candidate}")))?;
        let election = self
            .elections
            .get_mut(&root)
            .ok_or_else(|| ConsensusError::ElectionNotFound(format!("{root:?}")))?;

        if election.is_confirmed() {
            return Err(ConsensusError::ElectionAlreadyConfirmed);
        }

        let result = election.vote(voter, *candidate, weight, is_final, now);
        match result {
            VoteResult::Error(msg) => Err(ConsensusError::FinalVoteAlreadyCast(msg)),
            _ => Ok(election.try_confirm(now)),
        }
    }

    /// Advance every election's timers one scheduling tick. Confirmed and
    /// expired elections are removed and their roots returned, split by
    /// outcome.
    pub fn transition_all(&mut self, ttl_ms: u64, now: Timestamp) -> TransitionOutcome {
        let mut confirmed = Vec::new();
        let mut expired = Vec::new();

        for (root, election) in self.elections.iter_mut() {
            if election.transition_time(ttl_ms, now) {
                if election.is_confirmed() {
                    confirmed.push(*root);
                } else {
                    expired.push(*root);
                }
            }
        }

        for root in &confirmed {
            if let Some(mut election) = self.erase(root) {
                if let Some(status) = election.force_confirm(now) {
                    self.recently_confirmed.push_back((*root, status.winner));
                    while self.recently_confirmed.len() > self.recently_confirmed_cap {
                        self.recently_confirmed.pop_front();
                    }
                    self.recently_cemented.push_back(status);
                    while self.recently_cemented.len() > self.recently_cemented_cap {
                        self.recently_cemented.pop_front();
                    }
                }
            }
        }
        for root in &expired {
            if let ElectionBehavior::Optimistic = self
                .elections
                .get(root)
                .map(|e| e.behavior)
                .unwrap_or(ElectionBehavior::Normal)
            {
                self.expired_optimistic_elections.insert(root.root_account.clone());
            }
            self.erase(root);
        }

        TransitionOutcome { confirmed, expired }
    }

    /// Remove an election and every candidate hash it registered.
    pub fn erase(&mut self, root: &QualifiedRoot) -> Option<Election> {
        let election = self.elections.remove(root)?;
        self.block_index.retain(|_, r| r != root);
        self.insertion_order.retain(|r| r != root);
        Some(election)
    }

    /// Drop the oldest election (FIFO) to free a capacity slot.
    pub fn erase_oldest(&mut self) -> Option<QualifiedRoot> {
        let root = self.insertion_order.pop_front()?;
        self.elections.remove(&root);
        self.block_index.retain(|_, r| *r != root);
        Some(root)
    }

    /// Current elections, ordered by insertion, capped at `max`.
    pub fn list_active(&self, max: usize) -> Vec<QualifiedRoot> {
        self.insertion_order.iter().take(max).copied().collect()
    }

    /// Remaining election capacity (can be negative if over-filled by
    /// a capacity change).
    pub fn vacancy(&self) -> i64 {
        self.max_elections as i64 - self.elections.len() as i64
    }

    pub fn election_count(&self) -> usize {
        self.elections.len()
    }

    pub fn is_at_capacity(&self) -> bool {
        self.elections.len() >= self.max_elections
    }

    pub fn get_election(&self, root: &QualifiedRoot) -> Option<&Election> {
        self.elections.get(root)
    }

    pub fn get_election_mut(&mut self, root: &QualifiedRoot) -> Option<&mut Election> {
        self.elections.get_mut(root)
    }

    pub fn was_recently_confirmed(&self, root: &QualifiedRoot) -> bool {
        self.recently_confirmed.iter().any(|(r, _)| r == root)
    }

    pub fn recently_cemented(&self) -> impl Iterator<Item = &ElectionStatus> {
        self.recently_cemented.iter()
    }

    pub fn set_online_weight(&mut self, weight: u128) {
        self.online_weight = weight;
    }

    /// Record (or update) an account's uncemented-block count for the
    /// frontier-confirmation scheduler.
    pub fn prioritize_frontier(&mut self, account: Account, uncemented_count: u64) {
        if let Some(entry) = self
            .priority_cementable_frontiers
            .iter_mut()
            .find(|(a, _)| *a == account)
        {
            entry.1 = uncemented_count;
        } else {
            self.priority_cementable_frontiers.push((account, uncemented_count));
        }
        self.priority_cementable_frontiers
            .sort_by(|a, b| b.1.cmp(&a.1));
    }

    /// Pop the account with the most uncemented blocks.
    pub fn next_cementable_frontier(&mut self) -> Option<Account> {
        if self.priority_cementable_frontiers.is_empty() {
            None
        } else {
            Some(self.priority_cementable_frontiers.remove(0).0)
        }
    }

    pub fn mark_expired_optimistic(&mut self, account: Account) {
        self.expired_optimistic_elections.insert(account);
    }

    pub fn is_expired_optimistic(&self, account: &Account) -> bool {
        self.expired_optimistic_elections.contains(account)
    }

    /// Drain accounts awaiting pessimistic retry after an expired
    /// optimistic election.
    pub fn take_expired_optimistic(&mut self) -> Vec<Account> {
        self.expired_optimistic_elections.drain().collect()
    }
}

/// Outcome of one scheduling-loop transition pass.
#[derive(Debug, Default)]
pub struct TransitionOutcome {
    pub confirmed: Vec<QualifiedRoot>,
    pub expired: Vec<QualifiedRoot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hash(byte: u8) -> BlockHash {
        BlockHash::new([byte; 32])
    }

    fn root(byte: u8) -> QualifiedRoot {
        QualifiedRoot::new(make_hash(byte), Account::new(format!("bln_root{byte}")))
    }

    fn make_voter(name: &str) -> Account {
        Account::new(format!("bln_{name}"))
    }

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    #[test]
    fn insert_starts_election() {
        let mut ae = ActiveElections::new(10, 1000);
        assert!(ae
            .insert(root(1), make_hash(10), vec![], ElectionBehavior::Normal, ts(100))
            .unwrap());
        assert_eq!(ae.election_count(), 1);
        assert!(ae.get_election(&root(1)).is_some());
    }

    #[test]
    fn duplicate_insert_is_noop_success() {
        let mut ae = ActiveElections::new(10, 1000);
        ae.insert(root(1), make_hash(10), vec![], ElectionBehavior::Normal, ts(100))
            .unwrap();
        assert!(ae
            .insert(root(1), make_hash(11), vec![], ElectionBehavior::Normal, ts(101))
            .unwrap());
        assert_eq!(ae.election_count(), 1);
    }

    #[test]
    fn capacity_limit_enforced() {
        let mut ae = ActiveElections::new(2, 1000);
        ae.insert(root(1), make_hash(10), vec![], ElectionBehavior::Normal, ts(100))
            .unwrap();
        ae.insert(root(2), make_hash(20), vec![], ElectionBehavior::Normal, ts(100))
            .unwrap();

        let result = ae.insert(root(3), make_hash(30), vec![], ElectionBehavior::Normal, ts(100));
        assert!(matches!(
            result,
            Err(ConsensusError::ElectionCapacityReached(2))
        ));
        assert!(ae.is_at_capacity());
    }

    #[test]
    fn vote_routes_via_block_index() {
        let mut ae = ActiveElections::new(10, 1000);
        ae.insert(root(1), make_hash(10), vec![], ElectionBehavior::Normal, ts(100))
            .unwrap();

        let result = ae
            .vote(&make_hash(10), &make_voter("alice"), 300, false, ts(101))
            .unwrap();
        assert!(result.is_none());
        assert_eq!(ae.get_election(&root(1)).unwrap().leading_block(), Some((make_hash(10), 300)));
    }

    #[test]
    fn vote_unknown_candidate_errors() {
        let mut ae = ActiveElections::new(10, 1000);
        let result = ae.vote(&make_hash(99), &make_voter("alice"), 100, false, ts(100));
        assert!(matches!(result, Err(ConsensusError::ElectionNotFound(_))));
    }

    #[test]
    fn vote_confirms_and_transition_cements() {
        let mut ae = ActiveElections::new(10, 1000);
        ae.insert(root(1), make_hash(10), vec![], ElectionBehavior::Normal, ts(100))
            .unwrap();

        let result = ae
            .vote(&make_hash(10), &make_voter("alice"), 700, true, ts(101))
            .unwrap();
        assert!(result.is_some());

        let outcome = ae.transition_all(300_000, ts(102));
        assert_eq!(outcome.confirmed, vec![root(1)]);
        assert_eq!(ae.election_count(), 0);
        assert!(ae.was_recently_confirmed(&root(1)));
    }

    #[test]
    fn transition_expires_stale_election() {
        let mut ae = ActiveElections::new(10, 1000);
        ae.insert(root(1), make_hash(10), vec![], ElectionBehavior::Normal, ts(100))
            .unwrap();

        let outcome = ae.transition_all(30_000, ts(200));
        assert_eq!(outcome.expired, vec![root(1)]);
        assert_eq!(ae.election_count(), 0);
    }

    #[test]
    fn optimistic_expiry_tracked_for_pessimistic_retry() {
        let mut ae = ActiveElections::new(10, 1000);
        let r = root(1);
        ae.insert(r, make_hash(10), vec![], ElectionBehavior::Optimistic, ts(100))
            .unwrap();

        ae.transition_all(1, ts(200));
        assert!(ae.is_expired_optimistic(&r.root_account));
        let drained = ae.take_expired_optimistic();
        assert_eq!(drained, vec![r.root_account]);
        assert!(!ae.is_expired_optimistic(&r.root_account));
    }

    #[test]
    fn erase_oldest_frees_capacity() {
        let mut ae = ActiveElections::new(2, 1000);
        ae.insert(root(1), make_hash(10), vec![], ElectionBehavior::Normal, ts(100))
            .unwrap();
        ae.insert(root(2), make_hash(20), vec![], ElectionBehavior::Normal, ts(101))
            .unwrap();
        assert!(ae.is_at_capacity());

        let dropped = ae.erase_oldest();
        assert_eq!(dropped, Some(root(1)));
        assert!(!ae.is_at_capacity());
        assert!(ae
            .insert(root(3), make_hash(30), vec![], ElectionBehavior::Normal, ts(102))
            .unwrap());
    }

    #[test]
    fn list_active_respects_insertion_order_and_cap() {
        let mut ae = ActiveElections::new(10, 1000);
        ae.insert(root(1), make_hash(10), vec![], ElectionBehavior::Normal, ts(100))
            .unwrap();
        ae.insert(root(2), make_hash(20), vec![], ElectionBehavior::Normal, ts(101))
            .unwrap();
        ae.insert(root(3), make_hash(30), vec![], ElectionBehavior::Normal, ts(102))
            .unwrap();

        let listed = ae.list_active(2);
        assert_eq!(listed, vec![root(1), root(2)]);
    }

    #[test]
    fn vacancy_reflects_live_count() {
        let mut ae = ActiveElections::new(3, 1000);
        assert_eq!(ae.vacancy(), 3);
        ae.insert(root(1), make_hash(10), vec![], ElectionBehavior::Normal, ts(100))
            .unwrap();
        assert_eq!(ae.vacancy(), 2);
    }

    #[test]
    fn prioritize_frontier_orders_descending() {
        let mut ae = ActiveElections::new(10, 1000);
        ae.prioritize_frontier(make_voter("alice"), 5);
        ae.prioritize_frontier(make_voter("bob"), 20);
        ae.prioritize_frontier(make_voter("carol"), 10);

        assert_eq!(ae.next_cementable_frontier(), Some(make_voter("bob")));
        assert_eq!(ae.next_cementable_frontier(), Some(make_voter("carol")));
        assert_eq!(ae.next_cementable_frontier(), Some(make_voter("alice")));
        assert_eq!(ae.next_cementable_frontier(), None);
    }

    #[test]
    fn prioritize_frontier_updates_existing_entry() {
        let mut ae = ActiveElections::new(10, 1000);
        ae.prioritize_frontier(make_voter("alice"), 5);
        ae.prioritize_frontier(make_voter("alice"), 50);

        assert_eq!(ae.next_cementable_frontier(), Some(make_voter("alice")));
        assert_eq!(ae.next_cementable_frontier(), None);
    }

    #[test]
    fn insert_refused_for_recently_confirmed_root() {
        let mut ae = ActiveElections::new(10, 1000);
        ae.insert(root(1), make_hash(10), vec![], ElectionBehavior::Normal, ts(100))
            .unwrap();
        ae.vote(&make_hash(10), &make_voter("alice"), 700, true, ts(101))
            .unwrap();
        ae.transition_all(300_000, ts(102));

        let result = ae.insert(root(1), make_hash(11), vec![], ElectionBehavior::Normal, ts(103));
        assert_eq!(result.unwrap(), false);
    }

    #[test]
    fn publish_adds_candidate_to_existing_election() {
        let mut ae = ActiveElections::new(10, 1000);
        ae.insert(root(1), make_hash(10), vec![], ElectionBehavior::Normal, ts(100))
            .unwrap();

        assert!(ae.publish(&root(1), make_hash(11), vec![]).unwrap());
        assert_eq!(ae.get_election(&root(1)).unwrap().candidate_count(), 2);

        let result = ae
            .vote(&make_hash(11), &make_voter("bob"), 200, false, ts(101))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn publish_unknown_root_errors() {
        let mut ae = ActiveElections::new(10, 1000);
        let result = ae.publish(&root(99), make_hash(1), vec![]);
        assert!(matches!(result, Err(ConsensusError::ElectionNotFound(_))));
    }
}
