//! Request extractors.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use voteledger_common::AppError;

/// JSON body extractor that reports every body problem as a 400.
///
/// The body is decoded as JSON whatever the `Content-Type` header says.
/// Malformed JSON and type mismatches become `Invalid JSON`; missing required
/// fields are left to the handler so they can be named in the error.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T> JsonBody<T>
where
    T: DeserializeOwned,
{
    /// Decode a raw request body.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(bytes).map(Self).map_err(|e| {
            tracing::debug!(reason = %e, "Rejected request body");
            AppError::BadRequest("Invalid JSON".to_string())
        })
    }
}

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(reason = %rejection.body_text(), "Failed to read request body");
            AppError::BadRequest("Invalid JSON".to_string())
        })?;
        Self::from_bytes(&bytes)
    }
}
