//! Confirmation-height processor thread (§5 role 5).
//!
//! Consumes election winners from the election loop, advances the winning
//! account's confirmation height to the winner's sideband height, and then
//! invokes the cemented callback — which is allowed to call back into C7 to
//! activate the cemented account's next unconfirmed block and, for send
//! blocks, the destination account (§4.7 "Block-cemented callback").

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;

use bln_ledger::Ledger;
use bln_store::block::BlockStore;
use bln_store::confirmation_height::{ConfirmationHeightInfo, ConfirmationHeightStore};
use bln_types::{Account, BlockHash};

use crate::observers::Observers;
use crate::shutdown::ShutdownController;

/// A winning block ready to be cemented.
pub struct CementRequest {
    pub account: Account,
    pub winner: BlockHash,
}

/// Invoked after a cementation commits, so C7 can activate successors.
/// Must be non-blocking (§6.5).
pub trait CementedCallback: Send + Sync {
    fn cemented(&self, account: &Account, height: u64, winner: &BlockHash);
}

pub struct NullCementedCallback;
impl CementedCallback for NullCementedCallback {
    fn cemented(&self, _account: &Account, _height: u64, _winner: &BlockHash) {}
}

pub struct ConfirmationHeightProcessor<S> {
    ledger: Arc<Ledger<S>>,
    observers: Arc<dyn Observers>,
    callback: Arc<dyn CementedCallback>,
    inbox: Receiver<CementRequest>,
}

pub struct ConfirmationHeightHandle {
    pub submit: SyncSender<CementRequest>,
}

impl<S> ConfirmationHeightProcessor<S>
where
    S: BlockStore + ConfirmationHeightStore + Send + Sync + 'static,
{
    pub fn spawn(
        ledger: Arc<Ledger<S>>,
        observers: Arc<dyn Observers>,
        callback: Arc<dyn CementedCallback>,
        shutdown: ShutdownController,
        inbox_capacity: usize,
    ) -> (std::thread::JoinHandle<()>, ConfirmationHeightHandle) {
        let (tx, rx) = sync_channel(inbox_capacity);
        let processor = ConfirmationHeightProcessor {
            ledger,
            observers,
            callback,
            inbox: rx,
        };

        let handle = std::thread::Builder::new()
            .name("confirmation_height".into())
            .spawn(move || processor.run(shutdown))
            .expect("spawn confirmation_height thread");

        (handle, ConfirmationHeightHandle { submit: tx })
    }

    fn run(self, shutdown: ShutdownController) {
        let _span = crate::tracing_spans::confirmation_height_span().entered();
        loop {
            match self
                .inbox
                .recv_timeout(std::time::Duration::from_millis(200))
            {
                Ok(req) => self.cement(req),
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

    fn cement(&self, req: CementRequest) {
        let store = self.ledger.store();
        let height = match store.height_of_block(&req.winner) {
            Ok(Some(h)) => h,
            Ok(None) => {
                tracing::warn!(account = %req.account, "cement requested for unknown block height");
                return;
            }
            Err(err) => {
                tracing::error!(error = %err, "store error reading block height for cementation");
                return;
            }
        };

        let current = store
            .get_confirmation_height(&req.account)
            .map(|info| info.height)
            .unwrap_or(0);
        if height <= current {
            return;
        }

        if let Err(err) = store.put_confirmation_height(
            &req.account,
            &ConfirmationHeightInfo {
                height,
                frontier_hash: req.winner,
            },
        ) {
            tracing::error!(error = %err, account = %req.account, "failed to persist confirmation height");
            return;
        }

        self.observers.active_stopped(req.winner);
        self.callback.cemented(&req.account, height, &req.winner);
    }
}
