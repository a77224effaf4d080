//! Token authentication endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use foodgram_common::AppResult;
use foodgram_core::LoginInput;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::no_content};

/// Login response.
#[derive(Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

/// Exchange email and password for an auth token.
async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<TokenResponse>> {
    let auth_token = state.user_service.login(input).await?;
    Ok(Json(TokenResponse { auth_token }))
}

/// Revoke the caller's token.
async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    state.user_service.logout(&user).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/token/login/", post(login))
        .route("/auth/token/logout/", post(logout))
}
