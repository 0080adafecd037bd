//! LMDB implementation of FinalVotesStore.
//!
//! Key is the qualified root's `previous ++ root_account` bytes.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use bln_store::final_votes::FinalVotesStore;
use bln_store::StoreError;
use bln_types::{BlockHash, QualifiedRoot};

use crate::LmdbError;

pub struct LmdbFinalVotesStore {
    pub(crate) env: Arc<Env>,
    pub(crate) final_votes_db: Database<Bytes, Bytes>,
}

fn root_key(root: &QualifiedRoot) -> Vec<u8> {
    let mut key = Vec::with_capacity(32 + root.root_account.as_str().len());
    key.extend_from_slice(root.previous.as_bytes());
    key.extend_from_slice(root.root_account.as_str().as_bytes());
    key
}

impl FinalVotesStore for LmdbFinalVotesStore {
    fn put_final_vote(
        &self,
        root: &QualifiedRoot,
        block_hash: &BlockHash,
    ) -> Result<(), StoreError> {
        let key = root_key(root);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.final_votes_db
            .put(&mut wtxn, &key, block_hash.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_final_vote(&self, root: &QualifiedRoot) -> Result<Option<BlockHash>, StoreError> {
        let key = root_key(root);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .final_votes_db
            .get(&rtxn, &key)
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => {
                let arr: [u8; 32] = bytes.try_into().map_err(|_| {
                    LmdbError::Serialization("invalid final vote hash length".into())
                })?;
                Ok(Some(BlockHash::new(arr)))
            }
            None => Ok(None),
        }
    }

    fn delete_final_vote(&self, root: &QualifiedRoot) -> Result<(), StoreError> {
        let key = root_key(root);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.final_votes_db
            .delete(&mut wtxn, &key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn final_vote_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.final_votes_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
