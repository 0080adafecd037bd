//! Vote processor thread pool (§5 role 3).
//!
//! A fixed pool of worker threads shares one bounded inbox and verifies
//! vote signatures concurrently — pure CPU-bound work with no I/O.
//! Validated votes are cached (§4.5) and forwarded to the election loop.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Arc, Mutex};

use bln_consensus::VoteCache;
use bln_crypto::{decode_address, verify_signature};
use bln_types::{Account, BlockHash, PublicKey};

use crate::broadcaster::Vote;
use crate::shutdown::ShutdownController;

/// A vote that passed signature verification and is ready for C6/C5 fan-out.
pub struct ValidatedVote {
    pub voter: Account,
    pub timestamp: u64,
    pub hashes: Vec<BlockHash>,
    pub is_final: bool,
}

/// Looks up a representative's current voting weight and whether it meets
/// the minimum-principal-weight threshold to be cached at all (§4.5).
pub trait WeightLookup: Send + Sync {
    fn weight_of(&self, rep: &Account) -> u128;
}

pub struct VoteProcessorHandle {
    pub submit: SyncSender<Vote>,
    pub validated: Receiver<ValidatedVote>,
}

/// Spawns a pool of `threads` worker threads pulling from a shared bounded
/// inbox. Each verifies the vote's signature and, on success, caches it in
/// `vote_cache` and forwards it on `validated` for the election loop.
pub fn spawn<W: WeightLookup + 'static>(
    threads: usize,
    vote_cache: Arc<Mutex<VoteCache>>,
    weights: Arc<W>,
    shutdown: ShutdownController,
    inbox_capacity: usize,
) -> (Vec<std::thread::JoinHandle<()>>, VoteProcessorHandle) {
    let (submit_tx, submit_rx) = sync_channel::<Vote>(inbox_capacity);
    let (valid_tx, valid_rx) = sync_channel(inbox_capacity);
    let inbox = Arc::new(Mutex::new(submit_rx));

    let mut handles = Vec::with_capacity(threads.max(1));
    for _ in 0..threads.max(1) {
        let inbox = inbox.clone();
        let vote_cache = vote_cache.clone();
        let weights = weights.clone();
        let valid_tx = valid_tx.clone();
        let shutdown = shutdown.clone();

        let handle = std::thread::Builder::new()
            .name("vote_processor".into())
            .spawn(move || {
                let _span = crate::tracing_spans::vote_processor_span().entered();
                loop {
                    let next = {
                        let rx = inbox.lock().unwrap();
                        rx.recv_timeout(std::time::Duration::from_millis(200))
                    };
                    match next {
                        Ok(vote) => verify_and_cache(&vote, &vote_cache, &*weights, &valid_tx),
                        Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                            if shutdown.is_stopped() {
                                break;
                            }
                        }
                        Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                    if shutdown.is_stopped() {
                        break;
                    }
                }
            })
            .expect("spawn vote_processor thread");
        handles.push(handle);
    }

    (
        handles,
        VoteProcessorHandle {
            submit: submit_tx,
            validated: valid_rx,
        },
    )
}

fn verify_and_cache<W: WeightLookup>(
    vote: &Vote,
    vote_cache: &Arc<Mutex<VoteCache>>,
    weights: &W,
    valid_tx: &SyncSender<ValidatedVote>,
) {
    if !signature_valid(vote) {
        tracing::debug!(voter = %vote.voter, "dropping vote with invalid signature");
        return;
    }

    let weight = weights.weight_of(&vote.voter);
    let is_final = vote.timestamp == u64::MAX;

    {
        let mut cache = vote_cache.lock().unwrap();
        for hash in &vote.hashes {
            cache.insert(*hash, vote.voter.clone(), weight, vote.timestamp, is_final);
        }
    }

    let _ = valid_tx.try_send(ValidatedVote {
        voter: vote.voter.clone(),
        timestamp: vote.timestamp,
        hashes: vote.hashes.clone(),
        is_final,
    });
}

fn signature_valid(vote: &Vote) -> bool {
    let Some(pubkey_bytes) = decode_address(vote.voter.as_str()) else {
        return false;
    };
    let public_key = PublicKey(pubkey_bytes);
    let preimage = vote_preimage(vote);
    verify_signature(&preimage, &vote.signature, &public_key)
}

/// Reconstructs the signed preimage for a vote: timestamp followed by each
/// voted hash, matching the wire layout of §6.2 minus the account/signature
/// fields (those aren't part of what's signed over).
fn vote_preimage(vote: &Vote) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + vote.hashes.len() * 32);
    buf.extend_from_slice(&vote.timestamp.to_be_bytes());
    for hash in &vote.hashes {
        buf.extend_from_slice(hash.as_bytes());
    }
    buf
}
