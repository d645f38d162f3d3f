//! API endpoints.

mod health;
mod transactions;

use axum::{Router, http::Uri};
use voteledger_common::AppError;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(transactions::router())
        .merge(health::router())
}

/// Mount the API router under `prefix` with a JSON 404 fallback.
///
/// An empty prefix mounts the routes at the root.
pub fn mount(prefix: &str) -> Router<AppState> {
    let api = if prefix.is_empty() {
        router()
    } else {
        Router::new().nest(prefix, router())
    };
    api.fallback(not_found)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
