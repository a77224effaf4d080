//! Shopping cart service.

use foodgram_common::{AppError, AppResult};
use foodgram_db::{
    entities::recipe,
    repositories::{RecipeRepository, ShoppingCartRepository},
};

use crate::shopping_list::ShoppingList;

/// Shopping cart service for business logic.
#[derive(Clone)]
pub struct ShoppingCartService {
    cart_repo: ShoppingCartRepository,
    recipe_repo: RecipeRepository,
}

impl ShoppingCartService {
    /// Create a new shopping cart service.
    #[must_use]
    pub const fn new(cart_repo: ShoppingCartRepository, recipe_repo: RecipeRepository) -> Self {
        Self {
            cart_repo,
            recipe_repo,
        }
    }

    /// Put a recipe in the user's cart and return the recipe.
    pub async fn add(&self, user_id: i32, recipe_id: i32) -> AppResult<recipe::Model> {
        let recipe = self.recipe_repo.get_by_id(recipe_id).await?;

        if self.cart_repo.exists(user_id, recipe_id).await? {
            return Err(AppError::Validation("Рецепт уже в списке покупок".to_string()));
        }

        self.cart_repo.create(user_id, recipe_id).await?;
        Ok(recipe)
    }

    /// Take a recipe out of the user's cart.
    pub async fn remove(&self, user_id: i32, recipe_id: i32) -> AppResult<()> {
        self.recipe_repo.get_by_id(recipe_id).await?;

        if !self.cart_repo.delete(user_id, recipe_id).await? {
            return Err(AppError::BadRequest(
                "Рецепта нет в списке покупок".to_string(),
            ));
        }
        Ok(())
    }

    /// Aggregate the ingredients of every recipe in the user's cart.
    pub async fn shopping_list(&self, user_id: i32) -> AppResult<ShoppingList> {
        let rows = self.cart_repo.cart_ingredients(user_id).await?;
        Ok(ShoppingList::from_rows(rows))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::create_test_recipe;
    use foodgram_db::entities::shopping_cart;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;

    fn service(recipe_db: MockDatabase, cart_db: MockDatabase) -> ShoppingCartService {
        ShoppingCartService::new(
            ShoppingCartRepository::new(Arc::new(cart_db.into_connection())),
            RecipeRepository::new(Arc::new(recipe_db.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_add_twice_is_validation_error() {
        let recipe_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_recipe(3, 1)]]);
        let cart_db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            shopping_cart::Model {
                id: 1,
                user_id: 2,
                recipe_id: 3,
                created_at: chrono::Utc::now().into(),
            },
        ]]);

        let result = service(recipe_db, cart_db).add(2, 3).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_shopping_list_aggregates_cart() {
        let row = |name: &str, unit: &str, amount: i32| {
            btreemap! {
                "name" => Value::String(Some(Box::new(name.to_string()))),
                "measurement_unit" => Value::String(Some(Box::new(unit.to_string()))),
                "amount" => Value::Int(Some(amount)),
            }
        };
        let cart_db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            row("мука", "г", 200),
            row("яйцо", "шт", 2),
            row("мука", "г", 300),
        ]]);

        let list = service(MockDatabase::new(DatabaseBackend::Postgres), cart_db)
            .shopping_list(2)
            .await
            .unwrap();

        let text = list.to_string();
        assert!(text.starts_with("Список покупок:\n\n"));
        assert!(text.contains("мука (г) — 500\n"));
        assert!(text.contains("яйцо (шт) — 2\n"));
    }
}
