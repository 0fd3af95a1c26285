//! Feed endpoint.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use social_common::AppResult;
use social_core::FeedPage;

use crate::{
    extractors::{AuthUser, Pagination},
    middleware::AppState,
    response::PostResponse,
};

/// Posts by followed users, newest first.
///
/// Unpaginated unless `limit` or `offset` is given.
async fn feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let page = FeedPage {
        limit: page
            .limit
            .map(|l| state.api_config.clamp_limit(Some(l))),
        offset: page.offset,
    };

    let posts = state.feed_service.get_feed(&user.id, page).await?;
    let details = state.post_service.details_many(posts).await?;

    Ok(Json(details.into_iter().map(PostResponse::from).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(feed))
}
