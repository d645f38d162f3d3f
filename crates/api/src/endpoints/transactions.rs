//! Transaction endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use validator::Validate;
use voteledger_common::{AppError, AppResult};
use voteledger_core::{BallotTransaction, NewTransaction, ResultTransaction, VoteTransaction};

use crate::{
    extractors::JsonBody,
    middleware::AppState,
    response::{MessageResponse, ResultResponse, TransactionsResponse, success},
};

// ==================== Request Types ====================

/// Create ballot request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBallotRequest {
    /// Required.
    pub ballot_id: Option<i64>,
    /// Opaque client signature, stored as given.
    #[validate(length(max = 1024))]
    pub signature: Option<String>,
}

/// Create vote request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVoteRequest {
    /// Required.
    pub ballot_id: Option<i64>,
    /// Required.
    pub candidate_id: Option<i64>,
    /// Opaque client signature, stored as given.
    #[validate(length(max = 1024))]
    pub signature: Option<String>,
}

/// Create result request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateResultRequest {
    /// Required.
    pub candidate_id: Option<i64>,
    /// Required, non-negative.
    #[validate(range(min = 0, message = "vote_count must not be negative"))]
    pub vote_count: Option<i64>,
    /// Opaque client signature, stored as given.
    #[validate(length(max = 1024))]
    pub signature: Option<String>,
}

/// Time range request. Both bounds are inclusive.
#[derive(Debug, Deserialize)]
pub struct TimeRangeRequest {
    /// Lower bound, see [`parse_timestamp`].
    pub start_time: Option<String>,
    /// Upper bound, see [`parse_timestamp`].
    pub end_time: Option<String>,
}

// ==================== Helpers ====================

fn required<T>(value: Option<T>, field: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// Split a trailing zone abbreviation (`Z`, or three to five letters such as
/// `UTC`, `MSK`, `ChST`) off a timestamp.
fn split_zone_abbreviation(raw: &str) -> Option<&str> {
    let letters = raw
        .bytes()
        .rev()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    let zone = &raw[raw.len() - letters..];
    (zone == "Z" || (3..=5).contains(&letters)).then(|| &raw[..raw.len() - letters])
}

/// Parse a client timestamp.
///
/// Accepts RFC 3339 (`2024-05-01T12:00:00Z`, `2024-05-01T14:00:00+02:00`) and
/// the zone-name layout `2024-05-01T12:00:00.000UTC`. Zone abbreviations carry
/// no offset, so every abbreviation is read as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    let local = split_zone_abbreviation(raw)?;
    NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_bound(raw: Option<&str>, field: &str) -> AppResult<DateTime<Utc>> {
    raw.and_then(parse_timestamp)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {field}")))
}

// ==================== Handlers ====================

/// Record a ballot transaction.
async fn create_ballot(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateBallotRequest>,
) -> AppResult<Json<MessageResponse>> {
    req.validate()?;
    let ballot_id = required(req.ballot_id, "ballot_id")?;

    let tx = NewTransaction::new(BallotTransaction {
        ballot_id: Some(ballot_id),
    })
    .with_signature(req.signature);
    state.transaction_service.create(tx).await?;

    Ok(success())
}

/// Record a vote transaction.
async fn create_vote(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateVoteRequest>,
) -> AppResult<Json<MessageResponse>> {
    req.validate()?;
    let ballot_id = required(req.ballot_id, "ballot_id")?;
    let candidate_id = required(req.candidate_id, "candidate_id")?;

    let tx = NewTransaction::new(VoteTransaction {
        ballot_id,
        candidate_id,
    })
    .with_signature(req.signature);
    state.transaction_service.create(tx).await?;

    Ok(success())
}

/// Record a result transaction.
async fn create_result(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateResultRequest>,
) -> AppResult<Json<MessageResponse>> {
    req.validate()?;
    let candidate_id = required(req.candidate_id, "candidate_id")?;
    let vote_count = required(req.vote_count, "vote_count")?;

    let tx = NewTransaction::new(ResultTransaction {
        candidate_id,
        vote_count,
    })
    .with_signature(req.signature);
    state.transaction_service.create(tx).await?;

    Ok(success())
}

/// List every stored transaction.
async fn list(State(state): State<AppState>) -> AppResult<Json<TransactionsResponse>> {
    let transactions = state.transaction_service.list_all().await?;
    Ok(Json(TransactionsResponse { transactions }))
}

/// List transactions created inside a time range.
async fn list_by_time(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<TimeRangeRequest>,
) -> AppResult<Json<TransactionsResponse>> {
    let start = parse_bound(req.start_time.as_deref(), "start_time")?;
    let end = parse_bound(req.end_time.as_deref(), "end_time")?;

    let transactions = state.transaction_service.list_by_time(start, end).await?;
    Ok(Json(TransactionsResponse { transactions }))
}

/// Count votes per candidate.
async fn result(State(state): State<AppState>) -> AppResult<Json<ResultResponse>> {
    let result = state.transaction_service.results().await?;
    Ok(Json(ResultResponse { result }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transaction/ballot", post(create_ballot))
        .route("/transaction/vote", post(create_vote))
        .route("/transaction/result", post(create_result))
        .route("/transactions", get(list))
        .route("/transactions/time", get(list_by_time))
        .route("/result", get(result))
}
