//! Ingredient service.

use foodgram_common::{AppError, AppResult, Limits};
use foodgram_db::{entities::ingredient, repositories::IngredientRepository};
use serde::Deserialize;
use validator::Validate;

use crate::validation::validate_with_lengths;

/// One ingredient record from an import file.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IngredientRecord {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(length(min = 1))]
    pub measurement_unit: String,
}

/// Ingredient service for business logic.
#[derive(Clone)]
pub struct IngredientService {
    ingredient_repo: IngredientRepository,
    limits: Limits,
}

impl IngredientService {
    /// Create a new ingredient service.
    #[must_use]
    pub const fn new(ingredient_repo: IngredientRepository, limits: Limits) -> Self {
        Self {
            ingredient_repo,
            limits,
        }
    }

    /// Ingredients whose name starts with `name`, case-insensitively.
    pub async fn search(&self, name: Option<&str>) -> AppResult<Vec<ingredient::Model>> {
        self.ingredient_repo.search(name.map(str::trim)).await
    }

    /// Get an ingredient by ID.
    pub async fn get(&self, id: i32) -> AppResult<ingredient::Model> {
        self.ingredient_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ingredient {id}")))
    }

    /// Get-or-create every record; returns how many rows were inserted.
    pub async fn load(&self, records: Vec<IngredientRecord>) -> AppResult<usize> {
        let mut created = 0;
        for record in records {
            validate_with_lengths(
                &record,
                &[
                    ("name", record.name.trim(), self.limits.max_ingredient_name_length),
                    (
                        "measurement_unit",
                        record.measurement_unit.trim(),
                        self.limits.max_measurement_unit_length,
                    ),
                ],
            )?;
            let (_, inserted) = self
                .ingredient_repo
                .get_or_create(record.name.trim(), record.measurement_unit.trim())
                .await?;
            if inserted {
                created += 1;
            }
        }
        Ok(created)
    }
}
