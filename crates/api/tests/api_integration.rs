//! API integration tests.
//!
//! These tests drive the router end to end against a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase};
use serde_json::{Value, json};
use tower::ServiceExt;
use voteledger_api::{AppState, mount, router as api_router};
use voteledger_core::TransactionService;
use voteledger_db::{entities::transaction, repositories::TransactionRepository};

fn row(id: i64, kind: &str) -> transaction::Model {
    transaction::Model {
        id,
        kind: kind.to_string(),
        signature: None,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, id as u32 % 60).unwrap(),
        ballot_id: None,
        candidate_id: None,
        vote_count: None,
    }
}

fn ballot_row(id: i64, ballot_id: i64) -> transaction::Model {
    transaction::Model {
        ballot_id: Some(ballot_id),
        ..row(id, "ballot")
    }
}

fn vote_row(id: i64, ballot_id: i64, candidate_id: i64) -> transaction::Model {
    transaction::Model {
        ballot_id: Some(ballot_id),
        candidate_id: Some(candidate_id),
        ..row(id, "vote")
    }
}

fn result_row(id: i64, candidate_id: i64, vote_count: i64) -> transaction::Model {
    transaction::Model {
        candidate_id: Some(candidate_id),
        vote_count: Some(vote_count),
        ..row(id, "result")
    }
}

fn state_for(db: Arc<DatabaseConnection>) -> AppState {
    AppState::new(TransactionService::new(TransactionRepository::new(db)))
}

/// Router over `db`, plus a handle for inspecting the statements it ran.
fn create_test_router(db: MockDatabase) -> (Router, Arc<DatabaseConnection>) {
    let conn = Arc::new(db.into_connection());
    let router = api_router().with_state(state_for(Arc::clone(&conn)));
    (router, conn)
}

/// Statements executed so far. The router must already be dropped.
fn statement_log(conn: Arc<DatabaseConnection>) -> Vec<sea_orm::Transaction> {
    Arc::try_unwrap(conn).unwrap().into_transaction_log()
}

fn empty_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn json_request(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json")
        .body(body.into())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn assert_error(response: axum::response::Response, status: StatusCode, message: &str) {
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], message);
}

// ==================== Create ====================

#[tokio::test]
async fn test_create_ballot_returns_success() {
    let (app, conn) = create_test_router(empty_db().append_query_results([[ballot_row(1, 7)]]));

    let response = app
        .oneshot(json_request(
            "POST",
            "/transaction/ballot",
            r#"{"ballot_id":7,"signature":"sig"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"message": "success"}));
    assert_eq!(statement_log(conn).len(), 1);
}

#[tokio::test]
async fn test_create_ballot_without_ballot_id_is_rejected() {
    let (app, conn) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request("POST", "/transaction/ballot", "{}"))
        .await
        .unwrap();

    assert_error(response, StatusCode::BAD_REQUEST, "ballot_id is required").await;
    assert!(statement_log(conn).is_empty());
}

#[tokio::test]
async fn test_create_with_invalid_json_is_rejected() {
    let (app, conn) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request("POST", "/transaction/vote", "invalid json"))
        .await
        .unwrap();

    assert_error(response, StatusCode::BAD_REQUEST, "Invalid JSON").await;
    assert!(statement_log(conn).is_empty());
}

#[tokio::test]
async fn test_create_with_wrong_field_type_is_rejected() {
    let (app, _conn) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/transaction/vote",
            r#"{"ballot_id":"seven","candidate_id":1}"#,
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::BAD_REQUEST, "Invalid JSON").await;
}

#[tokio::test]
async fn test_create_vote_without_candidate_is_rejected() {
    let (app, conn) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request("POST", "/transaction/vote", r#"{"ballot_id":7}"#))
        .await
        .unwrap();

    assert_error(response, StatusCode::BAD_REQUEST, "candidate_id is required").await;
    assert!(statement_log(conn).is_empty());
}

#[tokio::test]
async fn test_create_vote_returns_success() {
    let (app, conn) = create_test_router(empty_db().append_query_results([[vote_row(2, 7, 3)]]));

    let response = app
        .oneshot(json_request(
            "POST",
            "/transaction/vote",
            r#"{"ballot_id":7,"candidate_id":3}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"message": "success"}));
    assert_eq!(statement_log(conn).len(), 1);
}

#[tokio::test]
async fn test_create_result_returns_success() {
    let (app, _conn) =
        create_test_router(empty_db().append_query_results([[result_row(3, 3, 42)]]));

    let response = app
        .oneshot(json_request(
            "POST",
            "/transaction/result",
            r#"{"candidate_id":3,"vote_count":42}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_result_without_vote_count_is_rejected() {
    let (app, conn) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/transaction/result",
            r#"{"candidate_id":3}"#,
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::BAD_REQUEST, "vote_count is required").await;
    assert!(statement_log(conn).is_empty());
}

#[tokio::test]
async fn test_create_result_with_negative_count_is_rejected() {
    let (app, conn) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/transaction/result",
            r#"{"candidate_id":3,"vote_count":-1}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(statement_log(conn).is_empty());
}

#[tokio::test]
async fn test_storage_failure_is_opaque() {
    let (app, _conn) = create_test_router(
        empty_db().append_query_errors([DbErr::Custom("connection refused on 10.0.0.5".into())]),
    );

    let response = app
        .oneshot(json_request("POST", "/transaction/ballot", r#"{"ballot_id":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Internal server error");
    assert!(!body.to_string().contains("10.0.0.5"));
}

// ==================== Queries ====================

#[tokio::test]
async fn test_list_transactions() {
    let (app, _conn) = create_test_router(empty_db().append_query_results([vec![
        ballot_row(1, 7),
        vote_row(2, 7, 3),
        row(3, "audit"),
        result_row(4, 3, 1),
    ]]));

    let response = app
        .oneshot(empty_request("GET", "/transactions"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 3);
    assert_eq!(transactions[0]["type"], "ballot");
    assert_eq!(transactions[0]["ballot_id"], 7);
    assert_eq!(transactions[1]["type"], "vote");
    assert_eq!(transactions[1]["candidate_id"], 3);
    assert_eq!(transactions[2]["type"], "result");
    assert_eq!(transactions[2]["vote_count"], 1);
}

#[tokio::test]
async fn test_list_transactions_empty() {
    let (app, _conn) =
        create_test_router(empty_db().append_query_results([Vec::<transaction::Model>::new()]));

    let response = app
        .oneshot(empty_request("GET", "/transactions"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"transactions": []}));
}

#[tokio::test]
async fn test_list_by_time() {
    let (app, conn) = create_test_router(empty_db().append_query_results([vec![vote_row(2, 7, 3)]]));

    let response = app
        .oneshot(json_request(
            "GET",
            "/transactions/time",
            r#"{"start_time":"2024-05-01T00:00:00Z","end_time":"2024-05-01T23:59:59.000UTC"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);

    let log = statement_log(conn);
    assert_eq!(log.len(), 1);
    assert!(format!("{:?}", log[0]).contains("BETWEEN"));
}

#[tokio::test]
async fn test_list_by_time_with_bad_start() {
    let (app, conn) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "GET",
            "/transactions/time",
            r#"{"start_time":"yesterday","end_time":"2024-05-01T00:00:00Z"}"#,
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::BAD_REQUEST, "Invalid start_time").await;
    assert!(statement_log(conn).is_empty());
}

#[tokio::test]
async fn test_list_by_time_with_missing_end() {
    let (app, _conn) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "GET",
            "/transactions/time",
            r#"{"start_time":"2024-05-01T00:00:00Z"}"#,
        ))
        .await
        .unwrap();

    assert_error(response, StatusCode::BAD_REQUEST, "Invalid end_time").await;
}

#[tokio::test]
async fn test_list_by_time_with_reversed_range() {
    let (app, conn) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "GET",
            "/transactions/time",
            r#"{"start_time":"2024-05-02T00:00:00Z","end_time":"2024-05-01T00:00:00Z"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(statement_log(conn).is_empty());
}

#[tokio::test]
async fn test_result_tallies_votes() {
    let (app, _conn) = create_test_router(empty_db().append_query_results([vec![
        vote_row(1, 7, 3),
        vote_row(2, 7, 3),
        vote_row(3, 8, 5),
    ]]));

    let response = app
        .oneshot(empty_request("GET", "/result"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let mut result: Vec<(i64, i64)> = body["result"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["candidate_id"].as_i64().unwrap(),
                r["vote_count"].as_i64().unwrap(),
            )
        })
        .collect();
    result.sort_unstable();
    assert_eq!(result, vec![(3, 2), (5, 1)]);
}

#[tokio::test]
async fn test_result_with_no_votes() {
    let (app, _conn) =
        create_test_router(empty_db().append_query_results([Vec::<transaction::Model>::new()]));

    let response = app
        .oneshot(empty_request("GET", "/result"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"result": []}));
}

#[tokio::test]
async fn test_list_by_time_without_content_type() {
    let (app, _conn) = create_test_router(empty_db().append_query_results([vec![vote_row(2, 7, 3)]]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/transactions/time")
                .method("GET")
                .body(Body::from(
                    r#"{"start_time":"2024-05-01T00:00:00Z","end_time":"2024-05-01T23:59:59Z"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_vote_with_form_content_type() {
    let (app, conn) = create_test_router(empty_db().append_query_results([[vote_row(2, 7, 3)]]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/transaction/vote")
                .method("POST")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(r#"{"ballot_id":7,"candidate_id":3}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(statement_log(conn).len(), 1);
}

// ==================== Routing ====================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _conn) = create_test_router(empty_db());

    let response = app
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = mount("").with_state(state_for(Arc::new(empty_db().into_connection())));

    let response = app
        .oneshot(empty_request("GET", "/nonexistent/endpoint"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let (app, _conn) = create_test_router(empty_db());

    let response = app
        .oneshot(empty_request("GET", "/transaction/ballot"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_routes_mounted_under_prefix() {
    let app = mount("/api").with_state(state_for(Arc::new(empty_db().into_connection())));

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
