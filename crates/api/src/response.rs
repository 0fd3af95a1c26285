//! API response types.
//!
//! Every body is camelCase JSON. Errors are rendered by
//! [`social_common::AppError`] as `{"detail", "code"}`.

#![allow(missing_docs)]

use std::collections::HashMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use social_core::{PostDetails, Profile};
use social_db::entities::{
    comment, notification,
    notification::{TargetType, Verb},
    user,
};

/// `{"detail": "..."}` confirmation body.
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub token: Option<String>,
}

impl From<user::Model> for RegisterResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            token: user.token,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: Option<String>,
    pub user_id: String,
    pub username: String,
}

impl From<user::Model> for LoginResponse {
    fn from(user: user::Model) -> Self {
        Self {
            token: user.token,
            user_id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub followers: Vec<String>,
    pub following: Vec<String>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.user.id,
            username: profile.user.username,
            email: profile.user.email,
            bio: profile.user.bio,
            profile_picture: profile.user.profile_picture,
            followers: profile.followers,
            following: profile.following,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowResponse {
    pub detail: String,
    pub action: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post: String,
    pub author: String,
    pub author_username: String,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl CommentResponse {
    #[must_use]
    pub fn new(comment: comment::Model, author_username: String) -> Self {
        Self {
            id: comment.id,
            post: comment.post_id,
            author: comment.author_id,
            author_username,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author: String,
    pub author_username: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
    pub likes_count: u64,
    pub comments: Vec<CommentResponse>,
}

impl From<PostDetails> for PostResponse {
    fn from(details: PostDetails) -> Self {
        let post = details.post;
        Self {
            id: post.id,
            author: post.author_id,
            author_username: details.author_username,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
            likes_count: details.likes_count,
            comments: details
                .comments
                .into_iter()
                .map(|(c, name)| CommentResponse::new(c, name))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub recipient: String,
    pub actor: String,
    pub actor_username: String,
    pub verb: Verb,
    pub timestamp: DateTime<FixedOffset>,
    pub read: bool,
    pub target_type: TargetType,
    pub target_id: String,
}

impl NotificationResponse {
    /// Build responses, looking actor names up in `usernames`.
    #[must_use]
    pub fn from_models(
        models: Vec<notification::Model>,
        usernames: &HashMap<String, String>,
    ) -> Vec<Self> {
        models
            .into_iter()
            .map(|n| Self {
                actor_username: usernames.get(&n.actor_id).cloned().unwrap_or_default(),
                id: n.id,
                recipient: n.recipient_id,
                actor: n.actor_id,
                verb: n.verb,
                timestamp: n.created_at,
                read: n.is_read,
                target_type: n.target_type,
                target_id: n.target_id,
            })
            .collect()
    }
}

/// JSON body with `201 Created`.
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// Empty success response.
#[must_use]
pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
