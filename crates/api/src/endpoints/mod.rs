//! API endpoints.

mod auth;
mod ingredients;
mod recipes;
mod short_links;
mod users;

use axum::{Router, extract::DefaultBodyLimit};

use crate::middleware::AppState;

/// Largest accepted request body. Recipe images and avatars arrive inline as
/// base64, so this is well above axum's 2 MB extractor default.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Create the API router, mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(ingredients::router())
        .merge(recipes::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// Short-link redirects, mounted at the site root.
pub fn short_link_router() -> Router<AppState> {
    short_links::router()
}
