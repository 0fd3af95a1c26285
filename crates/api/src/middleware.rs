//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sea_orm::DatabaseConnection;
use social_common::config::ApiConfig;
use social_core::{
    CommentService, FeedService, FollowingService, LikeService, NotificationService, PostService,
    UserService,
};
use social_db::repositories::{FollowingRepository, PostRepository, UserRepository};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub following_service: FollowingService,
    pub like_service: LikeService,
    pub notification_service: NotificationService,
    pub feed_service: FeedService,
    pub api_config: ApiConfig,
}

impl AppState {
    /// Wire every service to one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, api_config: ApiConfig) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let following_repo = FollowingRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));

        Self {
            user_service: UserService::new(user_repo, following_repo.clone()),
            post_service: PostService::new(Arc::clone(&db)),
            comment_service: CommentService::new(Arc::clone(&db)),
            following_service: FollowingService::new(Arc::clone(&db)),
            like_service: LikeService::new(Arc::clone(&db)),
            notification_service: NotificationService::new(db),
            feed_service: FeedService::new(following_repo, post_repo),
            api_config,
        }
    }
}

/// Extract the key from `Authorization: Token <key>` or `Bearer <key>`.
fn token_from_header(value: &str) -> Option<&str> {
    value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware.
///
/// Attaches the user to the request when the token is valid. Requests
/// without a valid token pass through; [`crate::extractors::AuthUser`]
/// rejects them where authentication is required.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = token_from_header(auth_str)
    {
        match state.user_service.authenticate_by_token(token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Token authentication failed"),
        }
    }

    next.run(req).await
}
