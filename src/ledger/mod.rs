//! Ledger service module
//!
//! Business rules for accounts: creation, crediting, and atomic transfers.

mod error;
mod service;

pub use error::LedgerError;
pub use service::LedgerService;
