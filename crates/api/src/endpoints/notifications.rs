//! Notification endpoints.

use axum::{Json, Router, extract::State, routing::get};
use social_common::AppResult;

use crate::{extractors::AuthUser, middleware::AppState, response::NotificationResponse};

/// List own notifications, newest first. Listing marks them read; the
/// response carries the state from before the call.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<NotificationResponse>>> {
    let notifications = state
        .notification_service
        .list_and_mark_read(&user.id)
        .await?;

    let mut actor_ids: Vec<String> = notifications.iter().map(|n| n.actor_id.clone()).collect();
    actor_ids.sort();
    actor_ids.dedup();
    let usernames = state.user_service.usernames(&actor_ids).await?;

    Ok(Json(NotificationResponse::from_models(
        notifications,
        &usernames,
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}
