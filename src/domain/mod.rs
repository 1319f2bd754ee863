//! Domain module
//!
//! Core domain types.

pub mod account;
pub mod amount;

pub use account::Account;
pub use amount::{Amount, AmountError};
