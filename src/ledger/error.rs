//! Ledger Error Types
//!
//! Business-rule errors, independent of the web layer. The display strings
//! of the transfer rejections are part of the public contract.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Credit or transfer with a non-positive amount
    #[error("amount must be greater than 0")]
    NonPositiveAmount,

    /// Amount is positive but outside what the store can represent
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Account creation with an empty name
    #[error("account name must not be empty")]
    EmptyName,

    /// Transfer where source and target are the same account
    #[error("cannot transfer to the same account")]
    SameAccountTransfer,

    /// Transfer target does not exist
    #[error("target account not found")]
    TargetAccountNotFound,

    /// Transfer source does not exist
    #[error("source account not found")]
    SourceAccountNotFound,

    /// Transfer amount exceeds the source balance
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Referenced account does not exist (single-account operations)
    #[error("account not found: {0}")]
    AccountNotFound(i64),

    /// Concurrent transfers kept conflicting and retries are exhausted;
    /// the caller may retry
    #[error("transfer conflicted with concurrent operations after {attempts} attempts")]
    Conflict { attempts: u32 },

    /// Storage failure, surfaced without retry
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl LedgerError {
    /// Errors caused by the request itself; detected before any mutation,
    /// never retried.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::NonPositiveAmount
                | Self::InvalidAmount(_)
                | Self::EmptyName
                | Self::SameAccountTransfer
                | Self::TargetAccountNotFound
                | Self::SourceAccountNotFound
                | Self::InsufficientBalance
        )
    }
}
