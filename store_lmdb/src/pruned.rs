//! LMDB implementation of PrunedStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use bln_store::pruned::PrunedStore;
use bln_store::StoreError;
use bln_types::BlockHash;

use crate::LmdbError;

pub struct LmdbPrunedStore {
    pub(crate) env: Arc<Env>,
    pub(crate) pruned_db: Database<Bytes, Bytes>,
}

impl PrunedStore for LmdbPrunedStore {
    fn put_pruned(&self, hash: &BlockHash) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.pruned_db
            .put(&mut wtxn, hash.as_bytes(), &[])
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_pruned(&self, hash: &BlockHash) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.pruned_db
            .delete(&mut wtxn, hash.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn is_pruned(&self, hash: &BlockHash) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let exists = self
            .pruned_db
            .get(&rtxn, hash.as_bytes())
            .map_err(LmdbError::from)?
            .is_some();
        Ok(exists)
    }

    fn iter_pruned(&self) -> Result<Vec<BlockHash>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut hashes = Vec::new();
        let iter = self.pruned_db.iter(&rtxn).map_err(LmdbError::from)?;
        for result in iter {
            let (key, _val) = result.map_err(LmdbError::from)?;
            let arr: [u8; 32] = key
                .try_into()
                .map_err(|_| LmdbError::Serialization("invalid pruned hash length".into()))?;
            hashes.push(BlockHash::new(arr));
        }
        Ok(hashes)
    }

    fn pruned_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.pruned_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
