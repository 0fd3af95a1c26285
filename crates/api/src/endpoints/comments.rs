//! Comment endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use social_common::AppResult;
use social_core::{CreateCommentInput, UpdateCommentInput};
use social_db::entities::comment;

use crate::{
    extractors::{AuthUser, JsonBody, Pagination},
    middleware::AppState,
    response::{CommentResponse, Created, no_content},
};

/// `GET /comments` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListCommentsQuery {
    /// Restrict to one post.
    pub post: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

async fn respond(state: &AppState, comment: comment::Model) -> AppResult<CommentResponse> {
    let author = state.user_service.get(&comment.author_id).await?;
    Ok(CommentResponse::new(comment, author.username))
}

/// List comments, oldest first.
async fn list(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListCommentsQuery>,
) -> AppResult<Json<Vec<CommentResponse>>> {
    let (limit, offset) = Pagination {
        limit: query.limit,
        offset: query.offset,
    }
    .resolve(&state.api_config);

    let comments = state
        .comment_service
        .list(query.post.as_deref(), limit, offset)
        .await?;

    let mut author_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
    author_ids.sort();
    author_ids.dedup();
    let usernames = state.user_service.usernames(&author_ids).await?;

    Ok(Json(
        comments
            .into_iter()
            .map(|c| {
                let name = usernames.get(&c.author_id).cloned().unwrap_or_default();
                CommentResponse::new(c, name)
            })
            .collect(),
    ))
}

/// Comment on a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateCommentInput>,
) -> AppResult<Created<CommentResponse>> {
    let comment = state.comment_service.create(&user.id, req).await?;
    Ok(Created(CommentResponse::new(comment, user.username)))
}

/// Show a comment.
async fn show(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> AppResult<Json<CommentResponse>> {
    let comment = state.comment_service.get(&comment_id).await?;
    Ok(Json(respond(&state, comment).await?))
}

/// Edit a comment.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    JsonBody(req): JsonBody<UpdateCommentInput>,
) -> AppResult<Json<CommentResponse>> {
    let comment = state
        .comment_service
        .update(&user.id, &comment_id, req)
        .await?;
    Ok(Json(CommentResponse::new(comment, user.username)))
}

/// Delete a comment.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.comment_service.delete(&user.id, &comment_id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list).post(create)).route(
        "/{comment_id}",
        get(show).patch(update).put(update).delete(delete),
    )
}
