//! Short-link redirects.

use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use foodgram_common::AppResult;

use crate::middleware::AppState;

/// Redirect a short link to the recipe page.
async fn resolve(
    State(state): State<AppState>,
    Path(short_link): Path<String>,
) -> AppResult<impl IntoResponse> {
    let recipe = state.recipe_service.resolve_short_link(&short_link).await?;
    let location = format!("/recipes/{}/", recipe.id);
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/s/{short_link}", get(resolve))
        .route("/s/{short_link}/", get(resolve))
}
