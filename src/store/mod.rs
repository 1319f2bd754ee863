//! Account Store module
//!
//! Persistence seam for account records. The ledger service is generic over
//! [`AccountStore`], so the business rules never depend on a concrete
//! database driver; driver error identity is translated into [`StoreError`]
//! here at the boundary.

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgAccountStore;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::Account;

/// Errors that can occur in the account store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No account with the given id
    #[error("account not found: {0}")]
    NotFound(i64),

    /// The backend rejected one of two conflicting concurrent commits;
    /// the operation may be retried
    #[error("conflict with a concurrent transaction")]
    Conflict,

    /// A row constraint (balance >= 0) was violated
    #[error("balance constraint violated")]
    CheckViolation,

    /// Any other database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Conflicts are the only store errors worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict)
    }
}

/// Durable storage of account records plus the atomicity primitive.
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    type Uow: UnitOfWork;

    /// Insert a new account with balance 0 and return the stored record,
    /// including its assigned id. Duplicate names are not an error.
    async fn create_account(&self, name: &str) -> Result<Account, StoreError>;

    /// Fetch a single account. `NotFound` if the id is unknown.
    async fn get_account(&self, id: i64) -> Result<Account, StoreError>;

    /// Fresh snapshot of all accounts, ordered by id.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;

    /// Atomically add `amount` to the balance and bump `updated_at`.
    /// Positivity of `amount` is enforced by the caller.
    async fn credit_account(&self, id: i64, amount: Decimal) -> Result<(), StoreError>;

    /// Open a scoped atomic unit of work over multiple rows.
    async fn begin(&self) -> Result<Self::Uow, StoreError>;
}

/// A scoped atomic unit of work.
///
/// Dropping the handle without calling [`commit`](UnitOfWork::commit) rolls
/// back and releases every row hold, on any exit path (error return, panic,
/// cancellation). No partial effect persists.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Read an account under a row-level exclusive hold that lasts until
    /// the unit of work ends. May suspend while another in-flight unit of
    /// work holds the same row.
    async fn get_account_for_update(&mut self, id: i64) -> Result<Option<Account>, StoreError>;

    /// Add `amount` to the balance within this unit of work.
    async fn credit(&mut self, id: i64, amount: Decimal) -> Result<(), StoreError>;

    /// Subtract `amount` from the balance within this unit of work.
    async fn debit(&mut self, id: i64, amount: Decimal) -> Result<(), StoreError>;

    /// Commit all changes made within this unit of work.
    async fn commit(self) -> Result<(), StoreError>;

    /// Discard all changes and release every hold.
    async fn rollback(self) -> Result<(), StoreError>;
}
