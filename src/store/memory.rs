//! In-memory account store for tests.
//!
//! A single mutex over the account map is held by each open unit of work,
//! so units of work are serialized exactly like row locks would serialize
//! conflicting transactions. Changes are staged on a copy of the map and
//! written back on commit; dropping the handle discards them.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::Account;

use super::{AccountStore, StoreError, UnitOfWork};

#[derive(Clone, Default)]
pub struct MemoryStore {
    accounts: Arc<Mutex<BTreeMap<i64, Account>>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    type Uow = MemoryUnitOfWork;

    async fn create_account(&self, name: &str) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let account = Account {
            id,
            name: name.to_string(),
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, id: i64) -> Result<Account, StoreError> {
        self.accounts
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.accounts.lock().await.values().cloned().collect())
    }

    async fn credit_account(&self, id: i64, amount: Decimal) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().await;
        let account = accounts.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        account.balance += amount;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn begin(&self) -> Result<MemoryUnitOfWork, StoreError> {
        let guard = self.accounts.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryUnitOfWork { guard, staged })
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<BTreeMap<i64, Account>>,
    staged: BTreeMap<i64, Account>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn get_account_for_update(&mut self, id: i64) -> Result<Option<Account>, StoreError> {
        Ok(self.staged.get(&id).cloned())
    }

    async fn credit(&mut self, id: i64, amount: Decimal) -> Result<(), StoreError> {
        let account = self.staged.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        account.balance += amount;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn debit(&mut self, id: i64, amount: Decimal) -> Result<(), StoreError> {
        let account = self.staged.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if account.balance < amount {
            // mirrors the CHECK (balance >= 0) constraint on the table
            return Err(StoreError::CheckViolation);
        }
        account.balance -= amount;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        *self.guard = self.staged;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_drop_discards_staged_changes() {
        let store = MemoryStore::new();
        let account = store.create_account("carol").await.unwrap();
        store.credit_account(account.id, dec!(10)).await.unwrap();

        {
            let mut uow = store.begin().await.unwrap();
            uow.debit(account.id, dec!(5)).await.unwrap();
            // dropped without commit
        }

        let reread = store.get_account(account.id).await.unwrap();
        assert_eq!(reread.balance, dec!(10));
    }

    #[tokio::test]
    async fn test_commit_applies_staged_changes() {
        let store = MemoryStore::new();
        let account = store.create_account("dave").await.unwrap();
        store.credit_account(account.id, dec!(10)).await.unwrap();

        let mut uow = store.begin().await.unwrap();
        uow.debit(account.id, dec!(4)).await.unwrap();
        uow.commit().await.unwrap();

        let reread = store.get_account(account.id).await.unwrap();
        assert_eq!(reread.balance, dec!(6));
    }

    #[tokio::test]
    async fn test_ids_are_assigned_in_order() {
        let store = MemoryStore::new();
        let a = store.create_account("a").await.unwrap();
        let b = store.create_account("a").await.unwrap(); // duplicate names allowed
        assert!(b.id > a.id);
    }
}
