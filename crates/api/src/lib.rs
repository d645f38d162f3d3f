//! HTTP API layer for voteledger.
//!
//! - **Endpoints**: transaction recording, listing and the vote tally
//! - **Extractors**: JSON bodies with uniform 400 rejections
//! - **Middleware**: shared application state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::{mount, router};
pub use middleware::AppState;
