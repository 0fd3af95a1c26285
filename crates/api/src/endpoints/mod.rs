//! API endpoints.

mod auth;
mod comments;
mod feed;
mod following;
mod notifications;
mod posts;
mod profile;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(following::router())
        .nest("/profile", profile::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/notifications", notifications::router())
        .nest("/feed", feed::router())
}
