//! Own profile endpoints.

use axum::{Json, Router, extract::State, routing::get};
use social_common::AppResult;
use social_core::UpdateProfileInput;

use crate::{
    extractors::{AuthUser, JsonBody},
    middleware::AppState,
    response::ProfileResponse,
};

/// Get the authenticated user's profile.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.user_service.profile(&user.id).await?;
    Ok(Json(profile.into()))
}

/// Update bio and profile picture.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateProfileInput>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.user_service.update_profile(&user.id, req).await?;
    Ok(Json(profile.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(show).patch(update))
}
