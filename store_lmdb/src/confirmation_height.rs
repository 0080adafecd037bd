//! LMDB implementation of ConfirmationHeightStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use bln_store::confirmation_height::{ConfirmationHeightInfo, ConfirmationHeightStore};
use bln_store::StoreError;
use bln_types::{Account, BlockHash};

use crate::LmdbError;

pub struct LmdbConfirmationHeightStore {
    pub(crate) env: Arc<Env>,
    pub(crate) confirmation_height_db: Database<Bytes, Bytes>,
}

fn encode(info: &ConfirmationHeightInfo) -> [u8; 40] {
    let mut buf = [0u8; 40];
    buf[..8].copy_from_slice(&info.height.to_be_bytes());
    buf[8..].copy_from_slice(info.frontier_hash.as_bytes());
    buf
}

fn decode(bytes: &[u8]) -> Result<ConfirmationHeightInfo, LmdbError> {
    if bytes.len() != 40 {
        return Err(LmdbError::Serialization(
            "invalid confirmation height record length".into(),
        ));
    }
    let mut height_buf = [0u8; 8];
    height_buf.copy_from_slice(&bytes[..8]);
    let mut hash_buf = [0u8; 32];
    hash_buf.copy_from_slice(&bytes[8..]);
    Ok(ConfirmationHeightInfo {
        height: u64::from_be_bytes(height_buf),
        frontier_hash: BlockHash::new(hash_buf),
    })
}

impl ConfirmationHeightStore for LmdbConfirmationHeightStore {
    fn get_confirmation_height(
        &self,
        account: &Account,
    ) -> Result<ConfirmationHeightInfo, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .confirmation_height_db
            .get(&rtxn, account.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("confirmation height {}", account)))?;
        Ok(decode(val)?)
    }

    fn put_confirmation_height(
        &self,
        account: &Account,
        info: &ConfirmationHeightInfo,
    ) -> Result<(), StoreError> {
        let bytes = encode(info);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.confirmation_height_db
            .put(&mut wtxn, account.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_confirmation_height(&self, account: &Account) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.confirmation_height_db
            .delete(&mut wtxn, account.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn exists(&self, account: &Account) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let exists = self
            .confirmation_height_db
            .get(&rtxn, account.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .is_some();
        Ok(exists)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self
            .confirmation_height_db
            .len(&rtxn)
            .map_err(LmdbError::from)?;
        Ok(count)
    }
}
