//! # api-adapters
//!
//! The HTTP surface of DevConnector. With `web-axum` enabled this crate
//! provides the axum router, the token extractor and the mapping from
//! `AppError` to status codes; request metrics are always available.
//!
//! # Developer Note
//! Handlers never touch repositories directly. Each one resolves the caller
//! (if the route is protected), calls exactly one service operation and
//! serializes the result.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod router;
#[cfg(feature = "web-axum")]
pub mod state;

pub use metrics::Metrics;

#[cfg(feature = "web-axum")]
pub use error::ApiError;
#[cfg(feature = "web-axum")]
pub use extract::AuthUser;
#[cfg(feature = "web-axum")]
pub use router::build_router;
#[cfg(feature = "web-axum")]
pub use state::AppState;
