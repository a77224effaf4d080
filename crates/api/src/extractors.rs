//! Request extractors.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
};
use foodgram_common::{AppError, PageRequest};
use foodgram_db::entities::user;
use serde::de::DeserializeOwned;
use url::{Url, form_urlencoded};

use crate::middleware::AppState;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Path parameters. A segment that does not parse (e.g. `/recipes/abc/`)
/// is a JSON not-found error instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy)]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Path(value)| Self(value))
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "Rejected path parameters");
                AppError::NotFound(parts.uri.path().to_string())
            })
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl MaybeAuthUser {
    /// Borrow the caller, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&user::Model> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// `page`/`limit` query parameters plus the absolute request URL, for
/// building `next`/`previous` links.
#[derive(Debug, Clone)]
pub struct Paging {
    pub request: PageRequest,
    pub current: Url,
}

impl FromRequestParts<AppState> for Paging {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Nested routers see a stripped URI
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.clone(), |original| original.0.clone());

        let mut page = None;
        let mut limit = None;
        for (key, value) in form_urlencoded::parse(uri.query().unwrap_or("").as_bytes()) {
            match key.as_ref() {
                "page" => page = Some(value.into_owned()),
                "limit" => limit = Some(value.into_owned()),
                _ => {}
            }
        }

        let request = PageRequest::from_query(
            page.as_deref(),
            limit.as_deref(),
            &state.config.pagination,
        )?;

        let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());
        let current = Url::parse(&format!("{}{}", state.config.base_url(), path_and_query))
            .map_err(|e| AppError::Internal(format!("Invalid request URL: {e}")))?;

        Ok(Self { request, current })
    }
}
