//! Core business logic for voteledger.

pub mod model;
pub mod services;

pub use model::{
    BallotTransaction, ConversionError, NewTransaction, ResultSummary, ResultTransaction,
    Transaction, TransactionKind, TransactionType, VoteTransaction,
};
pub use services::*;
