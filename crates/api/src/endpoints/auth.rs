//! Registration and token login.

use axum::{Json, Router, extract::State, routing::post};
use social_common::AppResult;
use social_core::{LoginInput, RegisterInput};

use crate::{
    extractors::JsonBody,
    middleware::AppState,
    response::{Created, LoginResponse, RegisterResponse},
};

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterInput>,
) -> AppResult<Created<RegisterResponse>> {
    let user = state.user_service.register(req).await?;
    Ok(Created(user.into()))
}

/// Exchange credentials for the account's API token.
async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    let user = state.user_service.login(req).await?;
    Ok(Json(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
