//! Recipe repository.
//!
//! A recipe and its ingredient rows are always written together inside one
//! transaction: the ingredient set is replaced wholesale (delete, then bulk
//! insert), so readers never see a recipe with a partial ingredient list.

use std::sync::Arc;

use crate::entities::{Ingredient, Recipe, RecipeIngredient, ingredient, recipe, recipe_ingredient};
use crate::map_write_err;
use foodgram_common::{AppError, AppResult, PageRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// One ingredient line of a recipe payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    /// Ingredient ID.
    pub ingredient_id: i32,
    /// Amount in the ingredient's measurement unit.
    pub amount: i32,
}

/// Recipe repository for database operations.
#[derive(Clone)]
pub struct RecipeRepository {
    db: Arc<DatabaseConnection>,
}

impl RecipeRepository {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a recipe by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<recipe::Model>> {
        Recipe::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a recipe by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<recipe::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RecipeNotFound(id.to_string()))
    }

    /// Find a recipe by its short link token.
    pub async fn find_by_short_link(&self, short_link: &str) -> AppResult<Option<recipe::Model>> {
        Recipe::find()
            .filter(recipe::Column::ShortLink.eq(short_link))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List recipes matching `condition`, newest first.
    ///
    /// A page past the last one is rejected before any rows are fetched.
    pub async fn list(
        &self,
        condition: Condition,
        page: PageRequest,
    ) -> AppResult<(Vec<recipe::Model>, u64)> {
        let count = Recipe::find()
            .filter(condition.clone())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        page.ensure_in_range(count)?;

        let recipes = Recipe::find()
            .filter(condition)
            .order_by_desc(recipe::Column::PubDate)
            .order_by_desc(recipe::Column::Id)
            .offset(page.offset())
            .limit(page.page_size)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((recipes, count))
    }

    /// Recipes by one author, newest first, optionally truncated.
    pub async fn find_by_author(
        &self,
        author_id: i32,
        limit: Option<u64>,
    ) -> AppResult<Vec<recipe::Model>> {
        Recipe::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .order_by_desc(recipe::Column::PubDate)
            .order_by_desc(recipe::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count recipes by one author.
    pub async fn count_by_author(&self, author_id: i32) -> AppResult<u64> {
        Recipe::find()
            .filter(recipe::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ingredient rows of the given recipes joined with their ingredients,
    /// in insertion order.
    pub async fn find_ingredients(
        &self,
        recipe_ids: &[i32],
    ) -> AppResult<Vec<(recipe_ingredient::Model, ingredient::Model)>> {
        if recipe_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = RecipeIngredient::find()
            .filter(recipe_ingredient::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .order_by_asc(recipe_ingredient::Column::Id)
            .find_also_related(Ingredient)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(row, ingredient)| ingredient.map(|i| (row, i)))
            .collect())
    }

    /// Insert a recipe together with its ingredient rows.
    pub async fn create_with_ingredients(
        &self,
        model: recipe::ActiveModel,
        ingredients: &[IngredientAmount],
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let recipe = model
            .insert(&txn)
            .await
            .map_err(|e| map_write_err(e, "Recipe"))?;
        insert_ingredients(&txn, recipe.id, ingredients).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(recipe)
    }

    /// Update a recipe and replace its ingredient rows.
    pub async fn update_with_ingredients(
        &self,
        model: recipe::ActiveModel,
        ingredients: &[IngredientAmount],
    ) -> AppResult<recipe::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let recipe = model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        RecipeIngredient::delete_many()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe.id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        insert_ingredients(&txn, recipe.id, ingredients).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(recipe)
    }

    /// Delete a recipe. Ingredient rows, favorites and cart entries cascade.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        Recipe::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

async fn insert_ingredients(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    ingredients: &[IngredientAmount],
) -> AppResult<()> {
    if ingredients.is_empty() {
        return Ok(());
    }

    let rows = ingredients.iter().map(|item| recipe_ingredient::ActiveModel {
        recipe_id: Set(recipe_id),
        ingredient_id: Set(item.ingredient_id),
        amount: Set(item.amount),
        ..Default::default()
    });

    RecipeIngredient::insert_many(rows)
        .exec_without_returning(txn)
        .await
        .map_err(|e| map_write_err(e, "Recipe ingredient"))?;
    Ok(())
}
