//! Account record
//!
//! The single persisted entity of the ledger. One row per account in the
//! `accounts` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// A ledger account.
///
/// `id` is assigned by the store (BIGSERIAL), immutable and never reused.
/// Its total order is what multi-account operations use to acquire row
/// locks deterministically. `balance` is exact decimal and never negative
/// after a committed operation.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
