//! Ledger Service
//!
//! The only place business rules live. Validates requests, orchestrates
//! single-row operations directly, and runs the two-row transfer inside a
//! unit of work with deterministic lock ordering and bounded conflict retry.

use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::{Account, Amount, AmountError};
use crate::store::{AccountStore, StoreError, UnitOfWork};

use super::LedgerError;

const MAX_TRANSFER_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

/// Ledger business rules over an injected account store.
pub struct LedgerService<S> {
    store: S,
}

impl<S: AccountStore> LedgerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create an account with balance 0. Duplicate names are permitted.
    pub async fn create_account(&self, name: &str) -> Result<Account, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyName);
        }

        let account = self.store.create_account(name).await?;
        tracing::info!(account_id = account.id, "account created");
        Ok(account)
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        Ok(self.store.list_accounts().await?)
    }

    /// Add `amount` to an account balance.
    ///
    /// The existence check and the credit are two separate store calls;
    /// this is safe only because accounts are never deleted.
    pub async fn credit(&self, account_id: i64, amount: Decimal) -> Result<(), LedgerError> {
        let amount = validate_amount(amount)?;

        match self.store.get_account(account_id).await {
            Ok(_) => {}
            Err(StoreError::NotFound(id)) => return Err(LedgerError::AccountNotFound(id)),
            Err(e) => return Err(e.into()),
        }

        self.store
            .credit_account(account_id, amount.value())
            .await
            .map_err(|e| match e {
                StoreError::NotFound(id) => LedgerError::AccountNotFound(id),
                other => other.into(),
            })
    }

    /// Atomically move `amount` from `source_id` to `target_id`.
    ///
    /// Conflicts with concurrent units of work are retried with backoff up
    /// to `MAX_TRANSFER_ATTEMPTS` before surfacing `Conflict`. Validation
    /// failures are never retried and have no side effect.
    pub async fn transfer(
        &self,
        source_id: i64,
        target_id: i64,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let amount = validate_amount(amount)?;
        if source_id == target_id {
            return Err(LedgerError::SameAccountTransfer);
        }

        for attempt in 0..MAX_TRANSFER_ATTEMPTS {
            match self.try_transfer(source_id, target_id, &amount).await {
                Err(LedgerError::Storage(StoreError::Conflict)) => {
                    if attempt + 1 == MAX_TRANSFER_ATTEMPTS {
                        return Err(LedgerError::Conflict {
                            attempts: MAX_TRANSFER_ATTEMPTS,
                        });
                    }
                    tracing::warn!(
                        source_id,
                        target_id,
                        attempt = attempt + 1,
                        "transfer conflicted with a concurrent transaction, retrying"
                    );
                    tokio::time::sleep(RETRY_BASE_DELAY * (attempt + 1)).await;
                }
                other => return other,
            }
        }

        Err(LedgerError::Conflict {
            attempts: MAX_TRANSFER_ATTEMPTS,
        })
    }

    /// Single transfer attempt inside one unit of work.
    async fn try_transfer(
        &self,
        source_id: i64,
        target_id: i64,
        amount: &Amount,
    ) -> Result<(), LedgerError> {
        let mut uow = self.store.begin().await?;

        // Lock both rows in ascending id order regardless of transfer
        // direction, so two opposite transfers on the same pair can never
        // acquire holds in opposite order and deadlock.
        let (low_id, high_id) = if source_id < target_id {
            (source_id, target_id)
        } else {
            (target_id, source_id)
        };
        let low = uow.get_account_for_update(low_id).await?;
        let high = uow.get_account_for_update(high_id).await?;
        let (source, target) = if source_id == low_id {
            (low, high)
        } else {
            (high, low)
        };

        if target.is_none() {
            abort(uow).await;
            return Err(LedgerError::TargetAccountNotFound);
        }
        let Some(source) = source else {
            abort(uow).await;
            return Err(LedgerError::SourceAccountNotFound);
        };
        if source.balance < amount.value() {
            abort(uow).await;
            return Err(LedgerError::InsufficientBalance);
        }

        uow.debit(source_id, amount.value()).await?;
        uow.credit(target_id, amount.value()).await?;
        uow.commit().await?;

        tracing::info!(source_id, target_id, %amount, "transfer committed");
        Ok(())
    }
}

/// Roll back explicitly; the reason for the abort is what the caller
/// reports, so a rollback failure is only logged (the handle drop would
/// release the transaction anyway).
async fn abort<U: UnitOfWork>(uow: U) {
    if let Err(e) = uow.rollback().await {
        tracing::error!("failed to roll back unit of work: {e}");
    }
}

fn validate_amount(amount: Decimal) -> Result<Amount, LedgerError> {
    Amount::new(amount).map_err(|e| match e {
        AmountError::NotPositive(_) => LedgerError::NonPositiveAmount,
        other => LedgerError::InvalidAmount(other.to_string()),
    })
}
