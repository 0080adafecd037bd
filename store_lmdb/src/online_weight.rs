//! LMDB implementation of OnlineWeightStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use bln_store::online_weight::OnlineWeightStore;
use bln_store::StoreError;

use crate::LmdbError;

pub struct LmdbOnlineWeightStore {
    pub(crate) env: Arc<Env>,
    pub(crate) online_weight_db: Database<Bytes, Bytes>,
}

impl OnlineWeightStore for LmdbOnlineWeightStore {
    fn put_online_weight_sample(&self, timestamp: u64, weight: u128) -> Result<(), StoreError> {
        let key = timestamp.to_be_bytes();
        let val = weight.to_be_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.online_weight_db
            .put(&mut wtxn, &key, &val)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn trim_online_weight_samples(&self, keep: usize) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let total = self.online_weight_db.len(&wtxn).map_err(LmdbError::from)? as usize;
        if total <= keep {
            wtxn.commit().map_err(LmdbError::from)?;
            return Ok(());
        }
        let to_remove = total - keep;
        let stale: Vec<Vec<u8>> = {
            let iter = self
                .online_weight_db
                .iter(&wtxn)
                .map_err(LmdbError::from)?;
            iter.take(to_remove)
                .filter_map(|r| r.ok())
                .map(|(k, _)| k.to_vec())
                .collect()
        };
        for key in &stale {
            self.online_weight_db
                .delete(&mut wtxn, key)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_online_weight_samples(&self, limit: usize) -> Result<Vec<(u64, u128)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let iter = self
            .online_weight_db
            .rev_iter(&rtxn)
            .map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for entry in iter {
            if results.len() >= limit {
                break;
            }
            let (key, val) = entry.map_err(LmdbError::from)?;
            if key.len() != 8 || val.len() != 16 {
                continue;
            }
            let mut ts_buf = [0u8; 8];
            ts_buf.copy_from_slice(key);
            let mut wt_buf = [0u8; 16];
            wt_buf.copy_from_slice(val);
            results.push((u64::from_be_bytes(ts_buf), u128::from_be_bytes(wt_buf)));
        }
        Ok(results)
    }
}
