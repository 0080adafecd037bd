//! LMDB implementation of AccountStore — binary serialized, byte-keyed.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use bln_store::account::{AccountInfo, AccountStore};
use bln_store::StoreError;
use bln_types::Account;

use crate::LmdbError;

pub struct LmdbAccountStore {
    pub(crate) env: Arc<Env>,
    pub(crate) accounts_db: Database<Bytes, Bytes>,
}

impl AccountStore for LmdbAccountStore {
    fn get_account(&self, account: &Account) -> Result<AccountInfo, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .accounts_db
            .get(&rtxn, account.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("account {}", account.as_str())))?;
        let info: AccountInfo = bincode::deserialize(val).map_err(LmdbError::from)?;
        Ok(info)
    }

    fn put_account(&self, info: &AccountInfo) -> Result<(), StoreError> {
        let bytes = bincode::serialize(info).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.accounts_db
            .put(&mut wtxn, info.account.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.accounts_db
            .delete(&mut wtxn, account.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn exists(&self, account: &Account) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let exists = self
            .accounts_db
            .get(&rtxn, account.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .is_some();
        Ok(exists)
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.accounts_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }

    fn iter_accounts(&self) -> Result<Vec<AccountInfo>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut accounts = Vec::new();
        let iter = self.accounts_db.iter(&rtxn).map_err(LmdbError::from)?;
        for result in iter {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let info: AccountInfo = bincode::deserialize(val).map_err(LmdbError::from)?;
            accounts.push(info);
        }
        Ok(accounts)
    }

    fn iter_accounts_paged(
        &self,
        cursor: Option<&Account>,
        limit: usize,
    ) -> Result<Vec<AccountInfo>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut accounts = Vec::with_capacity(limit);

        match cursor {
            Some(addr) => {
                use std::ops::Bound;
                let key = addr.as_str().as_bytes();
                let bounds = (Bound::Excluded(key), Bound::<&[u8]>::Unbounded);
                let iter = self
                    .accounts_db
                    .range(&rtxn, &bounds)
                    .map_err(LmdbError::from)?;
                for result in iter {
                    if accounts.len() >= limit {
                        break;
                    }
                    let (_k, v) = result.map_err(LmdbError::from)?;
                    let info: AccountInfo = bincode::deserialize(v).map_err(LmdbError::from)?;
                    accounts.push(info);
                }
            }
            None => {
                let iter = self.accounts_db.iter(&rtxn).map_err(LmdbError::from)?;
                for result in iter {
                    if accounts.len() >= limit {
                        break;
                    }
                    let (_k, v) = result.map_err(LmdbError::from)?;
                    let info: AccountInfo = bincode::deserialize(v).map_err(LmdbError::from)?;
                    accounts.push(info);
                }
            }
        }

        Ok(accounts)
    }
}
