//! API middleware and shared state.

use voteledger_core::TransactionService;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Transaction recording and queries.
    pub transaction_service: TransactionService,
}

impl AppState {
    /// Build the state from its services.
    #[must_use]
    pub const fn new(transaction_service: TransactionService) -> Self {
        Self {
            transaction_service,
        }
    }
}
