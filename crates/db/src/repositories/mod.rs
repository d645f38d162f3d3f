//! Repositories wrapping database access.

mod transaction;

pub use transaction::TransactionRepository;
