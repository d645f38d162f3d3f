//! API response types.

use axum::Json;
use serde::Serialize;
use voteledger_core::{ResultSummary, Transaction};

/// Plain acknowledgement, e.g. `{"message":"success"}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

/// `{"transactions":[...]}`
#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    /// Matching transactions, flattened with their `type` tag.
    pub transactions: Vec<Transaction>,
}

/// `{"result":[{"candidate_id":..,"vote_count":..}]}`
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    /// One entry per candidate with at least one vote.
    pub result: Vec<ResultSummary>,
}

/// Success acknowledgement for write endpoints.
#[must_use]
pub fn success() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "success".to_string(),
    })
}
