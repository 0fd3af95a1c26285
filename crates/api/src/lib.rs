//! HTTP API layer for the social API.
//!
//! - **Endpoints**: accounts, posts, comments, follow and like toggles,
//!   notifications, feed
//! - **Extractors**: authentication, pagination
//! - **Middleware**: token authentication, shared state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};

/// The `/api` router with token authentication applied, ready to serve.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router())
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
