//! Shopping cart repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{RecipeIngredient, ShoppingCart, ingredient, recipe_ingredient, shopping_cart};
use crate::map_write_err;
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QuerySelect, RelationTrait, Set, sea_query::Query,
};

/// One ingredient line of a recipe sitting in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct CartIngredientRow {
    /// Ingredient name.
    pub name: String,
    /// Ingredient measurement unit.
    pub measurement_unit: String,
    /// Amount used by the recipe.
    pub amount: i32,
}

/// Shopping cart repository for database operations.
#[derive(Clone)]
pub struct ShoppingCartRepository {
    db: Arc<DatabaseConnection>,
}

impl ShoppingCartRepository {
    /// Create a new shopping cart repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if a recipe is in a user's cart.
    pub async fn exists(&self, user_id: i32, recipe_id: i32) -> AppResult<bool> {
        let found = ShoppingCart::find()
            .filter(shopping_cart::Column::UserId.eq(user_id))
            .filter(shopping_cart::Column::RecipeId.eq(recipe_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    /// Which of `recipe_ids` are in the user's cart.
    pub async fn in_cart_among(&self, user_id: i32, recipe_ids: &[i32]) -> AppResult<HashSet<i32>> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i32> = ShoppingCart::find()
            .select_only()
            .column(shopping_cart::Column::RecipeId)
            .filter(shopping_cart::Column::UserId.eq(user_id))
            .filter(shopping_cart::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids.into_iter().collect())
    }

    /// Add a recipe to the cart. A concurrent duplicate surfaces as a conflict.
    pub async fn create(&self, user_id: i32, recipe_id: i32) -> AppResult<shopping_cart::Model> {
        let model = shopping_cart::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "Shopping cart item"))
    }

    /// Remove a recipe from the cart. Returns `false` when it was not there.
    pub async fn delete(&self, user_id: i32, recipe_id: i32) -> AppResult<bool> {
        let result = ShoppingCart::delete_many()
            .filter(shopping_cart::Column::UserId.eq(user_id))
            .filter(shopping_cart::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Every ingredient row of every recipe in the user's cart.
    pub async fn cart_ingredients(&self, user_id: i32) -> AppResult<Vec<CartIngredientRow>> {
        let cart_recipes = Query::select()
            .column(shopping_cart::Column::RecipeId)
            .from(ShoppingCart)
            .and_where(shopping_cart::Column::UserId.eq(user_id))
            .to_owned();

        RecipeIngredient::find()
            .select_only()
            .column_as(ingredient::Column::Name, "name")
            .column_as(ingredient::Column::MeasurementUnit, "measurement_unit")
            .column(recipe_ingredient::Column::Amount)
            .join(JoinType::InnerJoin, recipe_ingredient::Relation::Ingredient.def())
            .filter(recipe_ingredient::Column::RecipeId.in_subquery(cart_recipes))
            .into_model::<CartIngredientRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
