//! Database entities.

pub mod transaction;

pub use transaction::Entity as Transaction;
