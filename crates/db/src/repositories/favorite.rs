//! Favorite repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{Favorite, favorite};
use crate::map_write_err;
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};

/// Favorite repository for database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    db: Arc<DatabaseConnection>,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if a recipe is favorited by a user.
    pub async fn exists(&self, user_id: i32, recipe_id: i32) -> AppResult<bool> {
        let found = Favorite::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    /// Which of `recipe_ids` the user has favorited.
    pub async fn favorited_among(&self, user_id: i32, recipe_ids: &[i32]) -> AppResult<HashSet<i32>> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i32> = Favorite::find()
            .select_only()
            .column(favorite::Column::RecipeId)
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids.into_iter().collect())
    }

    /// Create a favorite. A concurrent duplicate surfaces as a conflict.
    pub async fn create(&self, user_id: i32, recipe_id: i32) -> AppResult<favorite::Model> {
        let model = favorite::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "Favorite"))
    }

    /// Delete a favorite. Returns `false` when there was nothing to delete.
    pub async fn delete(&self, user_id: i32, recipe_id: i32) -> AppResult<bool> {
        let result = Favorite::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}
