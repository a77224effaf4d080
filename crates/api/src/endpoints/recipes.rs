//! Recipe endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use foodgram_common::AppResult;
use foodgram_core::{RecipeFilter, RecipeInput};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser, Paging, Path},
    middleware::AppState,
    response::{MinifiedRecipe, Page, RecipeResponse, no_content},
};

/// Recipe list filters. Unknown parameters (`page`, `limit`) are ignored here.
#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    pub author: Option<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

/// List recipes, newest first.
async fn list(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Query(query): Query<RecipeListQuery>,
    paging: Paging,
) -> AppResult<Json<Page<RecipeResponse>>> {
    let filter = RecipeFilter::from_query(
        query.author.as_deref(),
        query.is_favorited.as_deref(),
        query.is_in_shopping_cart.as_deref(),
    )?;

    let (details, count) = state
        .recipe_service
        .list(viewer.user(), &filter, paging.request)
        .await?;
    let results = details
        .into_iter()
        .map(|d| RecipeResponse::new(&state, d))
        .collect();
    Ok(Json(Page::new(results, count, &paging)))
}

/// Publish a recipe.
async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<RecipeInput>,
) -> AppResult<(StatusCode, Json<RecipeResponse>)> {
    let detail = state.recipe_service.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(RecipeResponse::new(&state, detail))))
}

async fn show(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<RecipeResponse>> {
    let detail = state.recipe_service.get(viewer.user(), id).await?;
    Ok(Json(RecipeResponse::new(&state, detail)))
}

/// Update a recipe. Serves both PATCH and PUT.
async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(input): Json<RecipeInput>,
) -> AppResult<Json<RecipeResponse>> {
    let detail = state.recipe_service.update(&user, id, input).await?;
    Ok(Json(RecipeResponse::new(&state, detail)))
}

async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.recipe_service.delete(&user, id).await?;
    Ok(no_content())
}

#[derive(Debug, Serialize)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ShortLinkResponse>> {
    let token = state.recipe_service.get_link(id).await?;
    Ok(Json(ShortLinkResponse {
        short_link: format!("{}/s/{token}", state.config.base_url()),
    }))
}

async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<MinifiedRecipe>)> {
    let recipe = state.favorite_service.add(user.id, id).await?;
    Ok((StatusCode::CREATED, Json(MinifiedRecipe::new(&state, recipe))))
}

async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.favorite_service.remove(user.id, id).await?;
    Ok(no_content())
}

async fn add_to_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<MinifiedRecipe>)> {
    let recipe = state.shopping_cart_service.add(user.id, id).await?;
    Ok((StatusCode::CREATED, Json(MinifiedRecipe::new(&state, recipe))))
}

async fn remove_from_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.shopping_cart_service.remove(user.id, id).await?;
    Ok(no_content())
}

/// Download the aggregated shopping list as a text attachment.
async fn download_shopping_cart(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<impl IntoResponse> {
    let list = state.shopping_cart_service.shopping_list(user.id).await?;
    tracing::debug!(user_id = user.id, items = list.items().len(), "Shopping list built");

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_list.txt\"",
            ),
        ],
        list.to_string(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes/", get(list).post(create))
        .route(
            "/recipes/download_shopping_cart/",
            get(download_shopping_cart),
        )
        .route(
            "/recipes/{id}/",
            get(show).patch(update).put(update).delete(delete),
        )
        .route("/recipes/{id}/get-link/", get(get_link))
        .route(
            "/recipes/{id}/favorite/",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/recipes/{id}/shopping_cart/",
            post(add_to_cart).delete(remove_from_cart),
        )
}
