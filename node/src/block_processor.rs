//! Ledger-writer thread (§5 role 1) — the exclusive holder of write
//! transactions. Block processing, rollback, and pruning all funnel
//! through here; nothing else calls [`bln_ledger::Ledger::process`] or
//! `::rollback` directly.
//!
//! Blocks rejected with `GapPrevious`/`GapSource` are not discarded: they
//! are stashed in an [`UncheckedMap`] keyed by the missing dependency, and
//! replayed automatically once that dependency is processed (§4.4).

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;

use bln_ledger::{Block, Ledger, ProcessResult, UncheckedMap};
use bln_store::account::AccountStore;
use bln_store::block::BlockStore;
use bln_store::confirmation_height::ConfirmationHeightStore;
use bln_store::frontier::FrontierStore;
use bln_store::pending::PendingStore;
use bln_store::pruned::PrunedStore;
use bln_types::{Account, BlockHash};

use crate::observers::{Observers, VoteWeight};
use crate::shutdown::ShutdownController;
use crate::tracing_spans::block_process_span;

/// One unit of work for the ledger-writer: a block to process, and the
/// account it belongs to (the caller already knows this — either from the
/// wire block's own `account` field, for state blocks, or from chain
/// context for legacy blocks).
pub struct BlockContext {
    pub account: Account,
    pub block: Block,
}

/// Outcome posted to the election loop and confirmation-height processor
/// once a block has been through [`Ledger::process`].
#[derive(Debug)]
pub struct ProcessedBlock {
    pub account: Account,
    pub hash: BlockHash,
    pub result: ProcessResult,
}

/// Bounded inbox + worker loop wrapping a [`Ledger`]. Submitters send
/// [`BlockContext`]s over `submit`; processed results are published on
/// `results` for the election loop and confirmation-height processor to
/// pick up.
pub struct BlockProcessor<S> {
    ledger: Arc<Ledger<S>>,
    unchecked: std::sync::Mutex<UncheckedMap>,
    observers: Arc<dyn Observers>,
    inbox: Receiver<BlockContext>,
    outbox: SyncSender<ProcessedBlock>,
}

/// Handle returned to the caller that spawns the ledger-writer thread.
pub struct BlockProcessorHandle {
    pub submit: SyncSender<BlockContext>,
    pub results: Receiver<ProcessedBlock>,
}

impl<S> BlockProcessor<S>
where
    S: AccountStore
        + BlockStore
        + FrontierStore
        + PendingStore
        + ConfirmationHeightStore
        + PrunedStore
        + Send
        + Sync
        + 'static,
{
    /// Build the processor and spawn its worker thread. `inbox_capacity`
    /// bounds backpressure on submitters; `unchecked_capacity` bounds the
    /// gap-dependency buffer.
    pub fn spawn(
        ledger: Arc<Ledger<S>>,
        observers: Arc<dyn Observers>,
        shutdown: ShutdownController,
        inbox_capacity: usize,
        unchecked_capacity: usize,
    ) -> (std::thread::JoinHandle<()>, BlockProcessorHandle) {
        let (submit_tx, submit_rx) = sync_channel(inbox_capacity);
        let (result_tx, result_rx) = sync_channel(inbox_capacity);

        let mut processor = BlockProcessor {
            ledger,
            unchecked: std::sync::Mutex::new(UncheckedMap::new(unchecked_capacity)),
            observers,
            inbox: submit_rx,
            outbox: result_tx,
        };

        let handle = std::thread::Builder::new()
            .name("ledger-writer".into())
            .spawn(move || processor.run(shutdown))
            .expect("spawn ledger-writer thread");

        (
            handle,
            BlockProcessorHandle {
                submit: submit_tx,
                results: result_rx,
            },
        )
    }

    fn run(&mut self, shutdown: ShutdownController) {
        let _span = crate::tracing_spans::ledger_writer_span().entered();
        loop {
            match self
                .inbox
                .recv_timeout(std::time::Duration::from_millis(200))
            {
                Ok(ctx) => self.process_one(ctx),
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
    }

    /// Process one block and, on success, replay whatever it unblocks from
    /// the gap-dependency buffer. On `GapPrevious`/`GapSource`, stash it.
    fn process_one(&mut self, ctx: BlockContext) {
        let hash_str = format!("{:?}", ctx.block.previous());
        let _span = block_process_span(&hash_str).entered();

        let BlockContext { account, block } = ctx;
        let result = self.ledger.process(&account, block.clone());

        match result {
            Ok(outcome) => {
                let hash = block.hash(&account);
                match &outcome {
                    ProcessResult::Progress => self.replay_dependents(hash),
                    ProcessResult::GapPrevious => {
                        self.unchecked.lock().unwrap().insert(block.previous(), block);
                    }
                    ProcessResult::GapSource => {
                        self.unchecked.lock().unwrap().insert(hash, block);
                    }
                    other if !other.is_success() => {
                        tracing::warn!(result = %other, hash = %hash_str, "block rejected");
                    }
                    _ => {}
                }

                self.observers
                    .blocks(&outcome, &[] as &[VoteWeight], &account, 0, false, false);

                let _ = self.outbox.try_send(ProcessedBlock {
                    account,
                    hash,
                    result: outcome,
                });
            }
            Err(err) => {
                tracing::error!(error = %err, "ledger infrastructure error processing block");
            }
        }
    }

    fn replay_dependents(&mut self, hash: BlockHash) {
        let dependents = self.unchecked.lock().unwrap().take_dependents(&hash);
        for block in dependents {
            if let Some(account) = block.account(None) {
                self.process_one(BlockContext { account, block });
            }
        }
    }
}
