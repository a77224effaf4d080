//! Ingredient repository.

use std::sync::Arc;

use crate::entities::{Ingredient, ingredient};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::{Expr, Func},
};

/// Ingredient repository for database operations.
#[derive(Clone)]
pub struct IngredientRepository {
    db: Arc<DatabaseConnection>,
}

impl IngredientRepository {
    /// Create a new ingredient repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an ingredient by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<ingredient::Model>> {
        Ingredient::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find ingredients by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<ingredient::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Ingredient::find()
            .filter(ingredient::Column::Id.is_in(ids.iter().copied()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ingredients whose name starts with `prefix` (case-insensitive), ordered by name.
    /// `None` or an empty prefix returns every ingredient.
    pub async fn search(&self, prefix: Option<&str>) -> AppResult<Vec<ingredient::Model>> {
        let mut query = Ingredient::find();

        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(ingredient::Column::Name)))
                    .like(prefix_pattern(prefix)),
            );
        }

        query
            .order_by_asc(ingredient::Column::Name)
            .order_by_asc(ingredient::Column::MeasurementUnit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an ingredient by its natural key.
    pub async fn find_by_name_and_unit(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> AppResult<Option<ingredient::Model>> {
        Ingredient::find()
            .filter(ingredient::Column::Name.eq(name))
            .filter(ingredient::Column::MeasurementUnit.eq(measurement_unit))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Return the existing `(name, measurement_unit)` row or insert it.
    /// The flag is `true` when a row was inserted.
    pub async fn get_or_create(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> AppResult<(ingredient::Model, bool)> {
        if let Some(existing) = self.find_by_name_and_unit(name, measurement_unit).await? {
            return Ok((existing, false));
        }

        let model = ingredient::ActiveModel {
            name: Set(name.to_string()),
            measurement_unit: Set(measurement_unit.to_string()),
            ..Default::default()
        };
        let created = model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| crate::map_write_err(e, "Ingredient"))?;

        Ok((created, true))
    }
}

/// Lowercased `LIKE` pattern matching names that start with `prefix`.
fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};

    fn ingredient(id: i32, name: &str, unit: &str) -> ingredient::Model {
        ingredient::Model {
            id,
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        }
    }

    #[test]
    fn test_prefix_pattern_escapes_wildcards() {
        assert_eq!(prefix_pattern("Мол"), "мол%");
        assert_eq!(prefix_pattern("50%_a"), "50\\%\\_a%");
    }

    #[test]
    fn test_search_sql_uses_lower_prefix() {
        let sql = Ingredient::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(ingredient::Column::Name)))
                    .like(prefix_pattern("Мол")),
            )
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"LOWER("name") LIKE 'мол%'"#), "{sql}");
    }

    #[tokio::test]
    async fn test_search_returns_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    ingredient(1, "молоко", "мл"),
                    ingredient(3, "мороженое", "г"),
                ]])
                .into_connection(),
        );

        let repo = IngredientRepository::new(db);
        let found = repo.search(Some("мол")).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "молоко");
    }

    #[tokio::test]
    async fn test_get_or_create_returns_existing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[ingredient(5, "соль", "г")]])
                .into_connection(),
        );

        let repo = IngredientRepository::new(db);
        let (found, created) = repo.get_or_create("соль", "г").await.unwrap();

        assert_eq!(found.id, 5);
        assert!(!created);
    }

    #[tokio::test]
    async fn test_get_or_create_inserts_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<ingredient::Model>::new()])
                .append_query_results([[ingredient(6, "сахар", "г")]])
                .into_connection(),
        );

        let repo = IngredientRepository::new(db);
        let (row, created) = repo.get_or_create("сахар", "г").await.unwrap();

        assert_eq!(row.id, 6);
        assert!(created);
    }
}
