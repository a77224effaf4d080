//! User endpoints: registration, profiles, password, avatar, subscriptions.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use foodgram_common::AppResult;
use foodgram_core::{CreateUserInput, SetPasswordInput, UserProfile, parse_recipes_limit};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser, Paging, Path},
    middleware::AppState,
    response::{CreatedUserResponse, Page, UserResponse, UserWithRecipes, no_content},
};

/// List users.
async fn list(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    paging: Paging,
) -> AppResult<Json<Page<UserResponse>>> {
    let (profiles, count) = state
        .user_service
        .list(viewer.user(), paging.request)
        .await?;
    let results = profiles
        .into_iter()
        .map(|p| UserResponse::new(&state, p))
        .collect();
    Ok(Json(Page::new(results, count, &paging)))
}

/// Register a new user.
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<CreatedUserResponse>)> {
    let user = state.user_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn show(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<UserResponse>> {
    let profile = state.user_service.get_profile(viewer.user(), id).await?;
    Ok(Json(UserResponse::new(&state, profile)))
}

/// Get current user.
async fn me(State(state): State<AppState>, AuthUser(user): AuthUser) -> Json<UserResponse> {
    let profile = UserProfile {
        user,
        is_subscribed: false,
    };
    Json(UserResponse::new(&state, profile))
}

async fn set_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<SetPasswordInput>,
) -> AppResult<StatusCode> {
    state.user_service.set_password(&user, input).await?;
    Ok(no_content())
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub avatar: Option<String>,
}

async fn set_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<AvatarRequest>,
) -> AppResult<Json<AvatarResponse>> {
    let updated = state
        .user_service
        .set_avatar(&user, req.avatar.as_deref())
        .await?;
    Ok(Json(AvatarResponse {
        avatar: updated.avatar.as_deref().map(|key| state.media_url(key)),
    }))
}

async fn delete_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<StatusCode> {
    state.user_service.delete_avatar(&user).await?;
    Ok(no_content())
}

#[derive(Debug, Deserialize)]
pub struct RecipesLimitQuery {
    pub recipes_limit: Option<String>,
}

/// Authors the caller follows.
async fn subscriptions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<RecipesLimitQuery>,
    paging: Paging,
) -> AppResult<Json<Page<UserWithRecipes>>> {
    let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref())?;
    let (authors, count) = state
        .subscription_service
        .list(&user, paging.request, recipes_limit)
        .await?;
    let results = authors
        .into_iter()
        .map(|a| UserWithRecipes::new(&state, a))
        .collect();
    Ok(Json(Page::new(results, count, &paging)))
}

async fn subscribe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Query(query): Query<RecipesLimitQuery>,
) -> AppResult<(StatusCode, Json<UserWithRecipes>)> {
    let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref())?;
    let author = state
        .subscription_service
        .subscribe(&user, id, recipes_limit)
        .await?;
    Ok((StatusCode::CREATED, Json(UserWithRecipes::new(&state, author))))
}

async fn unsubscribe(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.subscription_service.unsubscribe(&user, id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/", get(list).post(create))
        .route("/users/me/", get(me))
        .route("/users/me/avatar/", put(set_avatar).delete(delete_avatar))
        .route("/users/set_password/", post(set_password))
        .route("/users/subscriptions/", get(subscriptions))
        .route("/users/{id}/", get(show))
        .route("/users/{id}/subscribe/", post(subscribe).delete(unsubscribe))
}
