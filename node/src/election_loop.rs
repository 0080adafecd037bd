//! Election-loop thread (§5 role 2) — single thread driving C7. Performs
//! only read transactions against the ledger; mutates in-memory election
//! structures under the active-elections container's own lock.
//!
//! Each tick:
//! 1. drain newly processed blocks, publishing forks into their election
//!    (inserting a new election the first time a root is contested);
//! 2. drain validated votes, routing each to its election or leaving it in
//!    the inactive-votes cache for the vote processor to have already
//!    cached;
//! 3. call `transition_all`, which advances every election's timers and
//!    removes confirmed/expired ones;
//! 4. submit newly confirmed winners to the confirmation-height processor;
//! 5. sleep until the next `request_interval`.

use std::sync::mpsc::{Receiver, SyncSender};
use std::sync::{Arc, Mutex};

use bln_consensus::{ActiveElections, ElectionBehavior, RepWeightCache};
use bln_types::{QualifiedRoot, Timestamp};

use crate::block_processor::ProcessedBlock;
use crate::confirmation_height_processor::CementRequest;
use crate::shutdown::ShutdownController;
use crate::vote_processor::ValidatedVote;

pub struct ElectionLoopHandles {
    pub processed_blocks: Receiver<ProcessedBlock>,
    pub validated_votes: Receiver<ValidatedVote>,
    pub cement_submit: SyncSender<CementRequest>,
}

/// TTL for a normal election, in milliseconds (§4.6, "normal ~5 minutes").
pub const ELECTION_TTL_MS: u64 = 5 * 60 * 1000;

pub fn spawn(
    active_elections: Arc<Mutex<ActiveElections>>,
    rep_weights: Arc<Mutex<RepWeightCache>>,
    handles: ElectionLoopHandles,
    request_interval: std::time::Duration,
    shutdown: ShutdownController,
) -> std::thread::JoinHandle<()> {
    std::thread::Builder::new()
        .name("election_loop".into())
        .spawn(move || run(active_elections, rep_weights, handles, request_interval, shutdown))
        .expect("spawn election_loop thread")
}

fn run(
    active_elections: Arc<Mutex<ActiveElections>>,
    rep_weights: Arc<Mutex<RepWeightCache>>,
    handles: ElectionLoopHandles,
    request_interval: std::time::Duration,
    shutdown: ShutdownController,
) {
    let _span = crate::tracing_spans::election_loop_span().entered();
    loop {
        drain_processed_blocks(&active_elections, &handles.processed_blocks);
        drain_validated_votes(&active_elections, &rep_weights, &handles.validated_votes);

        let now = Timestamp::now();
        let outcome = active_elections
            .lock()
            .unwrap()
            .transition_all(ELECTION_TTL_MS, now);

        for root in &outcome.confirmed {
            let _ = handles.cement_submit.try_send(CementRequest {
                account: root.root_account.clone(),
                winner: root.previous,
            });
        }

        if shutdown.is_stopped() {
            break;
        }
        shutdown.wait_timeout(request_interval);
        if shutdown.is_stopped() {
            break;
        }
    }
}

fn drain_processed_blocks(
    active_elections: &Arc<Mutex<ActiveElections>>,
    inbox: &Receiver<ProcessedBlock>,
) {
    let now = Timestamp::now();
    while let Ok(processed) = inbox.try_recv() {
        if !matches!(processed.result, bln_ledger::ProcessResult::Fork) {
            continue;
        }
        let root = QualifiedRoot::new(processed.hash, processed.account.clone());
        let mut ae = active_elections.lock().unwrap();
        if ae.get_election(&root).is_none() {
            let _ = ae.insert(
                root,
                processed.hash,
                Vec::new(),
                ElectionBehavior::Normal,
                now,
            );
        } else {
            let _ = ae.publish(&root, processed.hash, Vec::new());
        }
    }
}

fn drain_validated_votes(
    active_elections: &Arc<Mutex<ActiveElections>>,
    rep_weights: &Arc<Mutex<RepWeightCache>>,
    inbox: &Receiver<ValidatedVote>,
) {
    let now = Timestamp::now();
    while let Ok(vote) = inbox.try_recv() {
        let weight = rep_weights.lock().unwrap().weight(&vote.voter);
        let mut ae = active_elections.lock().unwrap();
        for hash in &vote.hashes {
            let _ = ae.vote(hash, &vote.voter, weight, vote.is_final, now);
        }
    }
}
