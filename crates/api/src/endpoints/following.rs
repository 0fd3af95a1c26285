//! Following endpoints.
//!
//! `follow` and `unfollow` both toggle the edge; the response says which
//! way it went.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use social_common::AppResult;

use crate::{extractors::AuthUser, middleware::AppState, response::FollowResponse};

/// Toggle following a user.
async fn toggle(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<FollowResponse>> {
    let outcome = state
        .following_service
        .toggle_follow(&user.id, &user_id)
        .await?;

    Ok(Json(FollowResponse {
        detail: outcome.detail(),
        action: outcome.action.as_str(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow/{user_id}", post(toggle))
        .route("/unfollow/{user_id}", post(toggle))
}
