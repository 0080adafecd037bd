//! DAG block-lattice ledger.
//!
//! Each account has its own chain (like Nano's block-lattice).
//! Transactions are asynchronous — no global ordering.
//! Consensus is only needed for conflict resolution (double-spends).

pub mod account_chain;
pub mod block;
pub mod block_link;
pub mod epoch_registry;
pub mod error;
pub mod frontier;
pub mod genesis;
pub mod ledger;
pub mod pruning;
pub mod unchecked;

pub use account_chain::AccountChain;
pub use block::{
    Block, BlockDetails, ChangeBlock, OpenBlock, ReceiveBlock, SendBlock, Sideband, StateBlock,
    StoredBlock,
};
pub use block_link::link_as_account;
pub use epoch_registry::{epoch_link, EpochRegistry};
pub use error::{LedgerError, ProcessResult};
pub use frontier::DagFrontier;
pub use genesis::{burn_account, create_genesis_block, genesis_creator, genesis_hash, GenesisConfig};
pub use ledger::{migrate, Ledger, LedgerSummary};
pub use pruning::{prune_chain, PruneResult, PruningConfig};
pub use unchecked::UncheckedMap;
