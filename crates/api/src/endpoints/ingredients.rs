//! Ingredient endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use foodgram_common::AppResult;
use serde::Deserialize;

use crate::{extractors::Path, middleware::AppState, response::IngredientResponse};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

/// List ingredients, optionally by name prefix. Not paginated.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<IngredientResponse>>> {
    let ingredients = state
        .ingredient_service
        .search(query.name.as_deref())
        .await?;
    Ok(Json(ingredients.into_iter().map(Into::into).collect()))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<IngredientResponse>> {
    Ok(Json(state.ingredient_service.get(id).await?.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ingredients/", get(list))
        .route("/ingredients/{id}/", get(show))
}
