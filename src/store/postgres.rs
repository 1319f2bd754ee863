//! Postgres-backed account store.
//!
//! Row locks are taken with `SELECT ... FOR UPDATE`; read-committed plus an
//! exclusive hold on every balance destined for modification is enough to
//! rule out write skew between concurrent debits.
//!
//! SQLx errors are translated at this boundary:
//!
//! | PostgreSQL error code | StoreError | Scenario |
//! |-----------------------|------------|----------|
//! | `40001`, `40P01` | `Conflict` | Serialization failure / deadlock detected |
//! | `23514` | `CheckViolation` | `balance >= 0` check constraint |
//! | anything else | `Database` | I/O, connectivity, unexpected failures |

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::Account;

use super::{AccountStore, StoreError, UnitOfWork};

const SELECT_ACCOUNT: &str =
    "SELECT id, name, balance, created_at, updated_at FROM accounts WHERE id = $1";

/// Account store over a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    type Uow = PgUnitOfWork;

    async fn create_account(&self, name: &str) -> Result<Account, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (name, balance, created_at, updated_at)
            VALUES ($1, 0, NOW(), NOW())
            RETURNING id, name, balance, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(account)
    }

    async fn get_account(&self, id: i64) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(SELECT_ACCOUNT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            "SELECT id, name, balance, created_at, updated_at FROM accounts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn credit_account(&self, id: i64, amount: Decimal) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance + $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(amount)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    async fn begin(&self) -> Result<PgUnitOfWork, StoreError> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(PgUnitOfWork { tx })
    }
}

/// A unit of work backed by a Postgres transaction.
///
/// Dropping the transaction without commit rolls it back, which is what
/// gives the scoped-release guarantee of [`UnitOfWork`].
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn get_account_for_update(&mut self, id: i64) -> Result<Option<Account>, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, balance, created_at, updated_at
            FROM accounts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)
    }

    async fn credit(&mut self, id: i64, amount: Decimal) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance + $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(amount)
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    async fn debit(&mut self, id: i64, amount: Decimal) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance - $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(amount)
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.code().as_deref() {
            Some("40001") | Some("40P01") => return StoreError::Conflict,
            Some("23514") => return StoreError::CheckViolation,
            _ => {}
        }
    }
    StoreError::Database(err)
}
