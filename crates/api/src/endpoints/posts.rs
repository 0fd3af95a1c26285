//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use social_common::AppResult;
use social_core::{CreatePostInput, LikeAction, ListPostsInput, UpdatePostInput};

use crate::{
    extractors::{AuthUser, JsonBody, Pagination},
    middleware::AppState,
    response::{Created, DetailResponse, PostResponse, no_content},
};

/// `GET /posts` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    /// Author username.
    pub author: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// List posts.
async fn list(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let (limit, offset) = Pagination {
        limit: query.limit,
        offset: query.offset,
    }
    .resolve(&state.api_config);

    let posts = state
        .post_service
        .list(&ListPostsInput {
            author: query.author,
            search: query.search,
            ordering: query.ordering,
            limit,
            offset,
        })
        .await?;
    let details = state.post_service.details_many(posts).await?;

    Ok(Json(details.into_iter().map(PostResponse::from).collect()))
}

/// Create a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreatePostInput>,
) -> AppResult<Created<PostResponse>> {
    let post = state.post_service.create(&user.id, req).await?;
    let details = state.post_service.details(post).await?;
    Ok(Created(details.into()))
}

/// Show a post.
async fn show(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Json<PostResponse>> {
    let post = state.post_service.get(&post_id).await?;
    let details = state.post_service.details(post).await?;
    Ok(Json(details.into()))
}

/// Update a post.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    JsonBody(req): JsonBody<UpdatePostInput>,
) -> AppResult<Json<PostResponse>> {
    let post = state.post_service.update(&user.id, &post_id, req).await?;
    let details = state.post_service.details(post).await?;
    Ok(Json(details.into()))
}

/// Delete a post.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.post_service.delete(&user.id, &post_id).await?;
    Ok(no_content())
}

/// Toggle a like. `201` when liked, `200` when unliked.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let action = state.like_service.toggle_like(&user.id, &post_id).await?;

    let status = match action {
        LikeAction::Liked => StatusCode::CREATED,
        LikeAction::Unliked => StatusCode::OK,
    };

    Ok((status, Json(DetailResponse::new(action.detail()))).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route(
            "/{post_id}",
            get(show).patch(update).put(update).delete(delete),
        )
        .route("/{post_id}/like", post(like))
}
