//! API middleware and shared state.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use foodgram_common::{Config, StorageBackend};
use foodgram_core::{
    FavoriteService, IngredientService, RecipeService, ShoppingCartService, SubscriptionService,
    UserService,
};
use foodgram_db::repositories::{
    FavoriteRepository, IngredientRepository, RecipeRepository, ShoppingCartRepository,
    SubscriptionRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub ingredient_service: IngredientService,
    pub recipe_service: RecipeService,
    pub favorite_service: FavoriteService,
    pub shopping_cart_service: ShoppingCartService,
    pub subscription_service: SubscriptionService,
    pub storage: Arc<dyn StorageBackend>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: Config,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let ingredient_repo = IngredientRepository::new(Arc::clone(&db));
        let recipe_repo = RecipeRepository::new(Arc::clone(&db));
        let favorite_repo = FavoriteRepository::new(Arc::clone(&db));
        let cart_repo = ShoppingCartRepository::new(Arc::clone(&db));
        let subscription_repo = SubscriptionRepository::new(db);

        let user_service = UserService::new(
            user_repo.clone(),
            subscription_repo.clone(),
            Arc::clone(&storage),
            config.limits,
        );
        let recipe_service = RecipeService::new(
            recipe_repo.clone(),
            ingredient_repo.clone(),
            user_repo.clone(),
            favorite_repo.clone(),
            cart_repo.clone(),
            user_service.clone(),
            Arc::clone(&storage),
            config.limits,
        );

        Self {
            ingredient_service: IngredientService::new(ingredient_repo, config.limits),
            favorite_service: FavoriteService::new(favorite_repo, recipe_repo.clone()),
            shopping_cart_service: ShoppingCartService::new(cart_repo, recipe_repo.clone()),
            subscription_service: SubscriptionService::new(
                subscription_repo,
                user_repo,
                recipe_repo,
                user_service.clone(),
            ),
            user_service,
            recipe_service,
            storage,
            config: Arc::new(config),
        }
    }

    /// Absolute URL of a stored file.
    #[must_use]
    pub fn media_url(&self, key: &str) -> String {
        let url = self.storage.public_url(key);
        if url.starts_with("http://") || url.starts_with("https://") {
            url
        } else {
            format!("{}/{}", self.config.base_url(), url.trim_start_matches('/'))
        }
    }
}

/// Pull the token out of `Authorization: Token <key>` (or `Bearer <key>`).
fn bearer_token(req: &Request<Body>) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&req).map(ToOwned::to_owned) {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring unknown auth token"),
        }
    }

    next.run(req).await
}
