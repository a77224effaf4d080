//! Favorite service.

use foodgram_common::{AppError, AppResult};
use foodgram_db::{
    entities::recipe,
    repositories::{FavoriteRepository, RecipeRepository},
};

/// Favorite service for business logic.
#[derive(Clone)]
pub struct FavoriteService {
    favorite_repo: FavoriteRepository,
    recipe_repo: RecipeRepository,
}

impl FavoriteService {
    /// Create a new favorite service.
    #[must_use]
    pub const fn new(favorite_repo: FavoriteRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            favorite_repo,
            recipe_repo,
        }
    }

    /// Add a recipe to the user's favorites and return the recipe.
    pub async fn add(&self, user_id: i32, recipe_id: i32) -> AppResult<recipe::Model> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;

        if self.favorite_repo.exists(user_id, recipe_id).await? {
            return Err(AppError::Validation("Рецепт уже в избранном".to_string()));
        }

        self.favorite_repo.create(user_id, recipe_id).await?;
        Ok(recipe)
    }

    /// Remove a recipe from the user's favorites.
    pub async fn remove(&self, user_id: i32, recipe_id: i32) -> AppResult<()> {
        self.recipe_repo.get_by_id(recipe_id).await?;

        if !self.favorite_repo.delete(user_id, recipe_id).await? {
            return Err(AppError::BadRequest("Рецепта нет в избранном".to_string()));
        }
        Ok(())
    }
}
