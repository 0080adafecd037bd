//! LMDB environment setup.
//!
//! Opens a single `heed` environment and creates one database per logical
//! table (spec §6.3 "Persisted state"). All `Lmdb*Store` wrappers share the
//! same `Arc<Env>` and just address different named databases within it.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

pub struct LmdbEnvironment {
    pub(crate) env: Arc<Env>,
    pub(crate) accounts_db: Database<Bytes, Bytes>,
    pub(crate) blocks_db: Database<Bytes, Bytes>,
    pub(crate) account_blocks_db: Database<Bytes, Bytes>,
    pub(crate) block_height_db: Database<Bytes, Bytes>,
    pub(crate) frontiers_db: Database<Bytes, Bytes>,
    pub(crate) pending_db: Database<Bytes, Bytes>,
    pub(crate) online_weight_db: Database<Bytes, Bytes>,
    pub(crate) confirmation_height_db: Database<Bytes, Bytes>,
    pub(crate) pruned_db: Database<Bytes, Bytes>,
    pub(crate) final_votes_db: Database<Bytes, Bytes>,
    pub(crate) peers_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

/// Number of named databases created within the environment. Must match
/// `max_dbs` passed to `EnvOpenOptions`.
const NUM_DATABASES: u32 = 11;

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path).map_err(|e| LmdbError::Heed(e.to_string()))?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs.max(NUM_DATABASES))
                .open(path)
                .map_err(|e| LmdbError::Heed(e.to_string()))?
        };

        let mut wtxn = env.write_txn().map_err(LmdbError::from)?;
        let accounts_db = env
            .create_database(&mut wtxn, Some("accounts"))
            .map_err(LmdbError::from)?;
        let blocks_db = env
            .create_database(&mut wtxn, Some("blocks"))
            .map_err(LmdbError::from)?;
        let account_blocks_db = env
            .create_database(&mut wtxn, Some("account_blocks"))
            .map_err(LmdbError::from)?;
        let block_height_db = env
            .create_database(&mut wtxn, Some("block_height"))
            .map_err(LmdbError::from)?;
        let frontiers_db = env
            .create_database(&mut wtxn, Some("frontiers"))
            .map_err(LmdbError::from)?;
        let pending_db = env
            .create_database(&mut wtxn, Some("pending"))
            .map_err(LmdbError::from)?;
        let online_weight_db = env
            .create_database(&mut wtxn, Some("online_weight"))
            .map_err(LmdbError::from)?;
        let confirmation_height_db = env
            .create_database(&mut wtxn, Some("confirmation_height"))
            .map_err(LmdbError::from)?;
        let pruned_db = env
            .create_database(&mut wtxn, Some("pruned"))
            .map_err(LmdbError::from)?;
        let final_votes_db = env
            .create_database(&mut wtxn, Some("final_votes"))
            .map_err(LmdbError::from)?;
        let peers_db = env
            .create_database(&mut wtxn, Some("peers"))
            .map_err(LmdbError::from)?;
        let meta_db = env
            .create_database(&mut wtxn, Some("meta"))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        Ok(Self {
            env: Arc::new(env),
            accounts_db,
            blocks_db,
            account_blocks_db,
            block_height_db,
            frontiers_db,
            pending_db,
            online_weight_db,
            confirmation_height_db,
            pruned_db,
            final_votes_db,
            peers_db,
            meta_db,
        })
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    pub fn account_store(&self) -> crate::account::LmdbAccountStore {
        crate::account::LmdbAccountStore {
            env: self.env.clone(),
            accounts_db: self.accounts_db,
        }
    }

    pub fn block_store(&self) -> crate::block::LmdbBlockStore {
        crate::block::LmdbBlockStore {
            env: self.env.clone(),
            blocks_db: self.blocks_db,
            account_blocks_db: self.account_blocks_db,
            block_height_db: self.block_height_db,
        }
    }

    pub fn frontier_store(&self) -> crate::frontier::LmdbFrontierStore {
        crate::frontier::LmdbFrontierStore {
            env: self.env.clone(),
            frontiers_db: self.frontiers_db,
        }
    }

    pub fn pending_store(&self) -> crate::pending::LmdbPendingStore {
        crate::pending::LmdbPendingStore {
            env: self.env.clone(),
            pending_db: self.pending_db,
        }
    }

    pub fn online_weight_store(&self) -> crate::online_weight::LmdbOnlineWeightStore {
        crate::online_weight::LmdbOnlineWeightStore {
            env: self.env.clone(),
            online_weight_db: self.online_weight_db,
        }
    }

    pub fn confirmation_height_store(
        &self,
    ) -> crate::confirmation_height::LmdbConfirmationHeightStore {
        crate::confirmation_height::LmdbConfirmationHeightStore {
            env: self.env.clone(),
            confirmation_height_db: self.confirmation_height_db,
        }
    }

    pub fn pruned_store(&self) -> crate::pruned::LmdbPrunedStore {
        crate::pruned::LmdbPrunedStore {
            env: self.env.clone(),
            pruned_db: self.pruned_db,
        }
    }

    pub fn final_votes_store(&self) -> crate::final_votes::LmdbFinalVotesStore {
        crate::final_votes::LmdbFinalVotesStore {
            env: self.env.clone(),
            final_votes_db: self.final_votes_db,
        }
    }

    pub fn peer_store(&self) -> crate::peer::LmdbPeerStore {
        crate::peer::LmdbPeerStore {
            env: self.env.clone(),
            peers_db: self.peers_db,
        }
    }

    pub fn meta_store(&self) -> crate::meta::LmdbMetaStore {
        crate::meta::LmdbMetaStore {
            env: self.env.clone(),
            meta_db: self.meta_db,
        }
    }

    pub fn write_batch(
        &self,
    ) -> Result<crate::write_batch::WriteBatch<'_>, bln_store::StoreError> {
        crate::write_batch::WriteBatch::new(self)
    }
}
