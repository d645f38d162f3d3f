//! Business logic services.

pub mod transaction;

pub use transaction::{TransactionService, tally};
