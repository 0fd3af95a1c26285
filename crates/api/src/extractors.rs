//! Request extractors.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use serde::Deserialize;
use social_common::{AppError, config::ApiConfig};
use social_db::entities::user;

/// Authenticated user extractor.
///
/// Rejects with the standard 401 error body when the auth middleware did not
/// attach a user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get user from request extensions (set by auth middleware)
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// JSON request body.
///
/// Same as [`axum::Json`] but rejects through [`AppError`], so malformed or
/// incomplete bodies get the usual `{"detail","code"}` 400 response.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// `?limit=&offset=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    /// Limit clamped to the configured bounds, and the offset (default 0).
    #[must_use]
    pub fn resolve(self, config: &ApiConfig) -> (u64, u64) {
        (config.clamp_limit(self.limit), self.offset.unwrap_or(0))
    }
}
