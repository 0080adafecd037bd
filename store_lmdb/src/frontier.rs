//! LMDB implementation of the legacy frontier table (head hash -> account).

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use bln_store::frontier::FrontierStore;
use bln_store::StoreError;
use bln_types::{Account, BlockHash};

use crate::LmdbError;

pub struct LmdbFrontierStore {
    pub(crate) env: Arc<Env>,
    pub(crate) frontiers_db: Database<Bytes, Bytes>,
}

impl FrontierStore for LmdbFrontierStore {
    fn put_frontier(&self, head: &BlockHash, account: &Account) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.frontiers_db
            .put(&mut wtxn, head.as_bytes(), account.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_frontier(&self, head: &BlockHash) -> Result<Account, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .frontiers_db
            .get(&rtxn, head.as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("frontier {}", head)))?;
        let addr_str =
            std::str::from_utf8(val).map_err(|e| LmdbError::Serialization(e.to_string()))?;
        Ok(Account::new(addr_str))
    }

    fn delete_frontier(&self, head: &BlockHash) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.frontiers_db
            .delete(&mut wtxn, head.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_frontiers(&self) -> Result<Vec<(BlockHash, Account)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut frontiers = Vec::new();
        let iter = self.frontiers_db.iter(&rtxn).map_err(LmdbError::from)?;
        for result in iter {
            let (key, val) = result.map_err(LmdbError::from)?;
            let arr: [u8; 32] = key
                .try_into()
                .map_err(|_| LmdbError::Serialization("invalid frontier hash length".into()))?;
            let addr_str =
                std::str::from_utf8(val).map_err(|e| LmdbError::Serialization(e.to_string()))?;
            frontiers.push((BlockHash::new(arr), Account::new(addr_str)));
        }
        Ok(frontiers)
    }

    fn frontier_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.frontiers_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
