//! Node orchestration — wires the ledger (C1-C4) and active-elections
//! engine (C5-C7) together into the five worker threads described in
//! the node's data-flow: ledger-writer, election loop, vote processor
//! pool, confirmation-height processor, and the wallet's action worker.
//!
//! This crate owns no peer transport, no RPC/WebSocket surface, and no
//! bootstrap protocol — those are named interfaces (see [`broadcaster`])
//! an embedder supplies.

pub mod block_processor;
pub mod broadcaster;
pub mod confirmation_height_processor;
pub mod election_loop;
pub mod error;
pub mod logging;
pub mod node;
pub mod observers;
pub mod shutdown;
pub mod tracing_spans;
pub mod vote_processor;

pub use block_processor::{BlockContext, BlockProcessor, BlockProcessorHandle, ProcessedBlock};
pub use broadcaster::{BootstrapHint, Broadcaster, NullBroadcaster, Vote};
pub use confirmation_height_processor::{
    CementRequest, CementedCallback, ConfirmationHeightHandle, ConfirmationHeightProcessor,
    NullCementedCallback,
};
pub use election_loop::ElectionLoopHandles;
pub use error::NodeError;
pub use logging::init_logging;
pub use node::BlnNode;
pub use observers::{NullObservers, Observers, VoteWeight};
pub use shutdown::ShutdownController;
pub use vote_processor::{ValidatedVote, VoteProcessorHandle, WeightLookup};
