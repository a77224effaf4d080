//! Payload validation.
//!
//! Static field rules live on the input types via `validator`; the rules that
//! depend on configured [`Limits`] are checked here. All failures are
//! collected into one field-keyed error.

use std::collections::HashSet;

use foodgram_common::{AppError, AppResult, FieldErrors, Limits, collect_field_errors};
use foodgram_db::repositories::IngredientAmount;
use validator::Validate;

use crate::services::recipe::RecipeInput;

const REQUIRED: &str = "Обязательное поле.";

/// Whether a payload creates a recipe or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every field is required.
    Create,
    /// Only `ingredients` is required; absent fields keep their values.
    Update,
}

/// Validator for recipe create/update payloads.
#[derive(Debug, Clone, Copy)]
pub struct RecipeValidator {
    limits: Limits,
}

impl RecipeValidator {
    #[must_use]
    pub const fn new(limits: Limits) -> Self {
        Self { limits }
    }

    /// Validate `input` and return its ingredient lines in submitted order.
    ///
    /// Ingredient existence is not checked here; see
    /// [`RecipeValidator::check_known_ingredients`].
    pub fn validate(
        &self,
        input: &RecipeInput,
        mode: ValidationMode,
    ) -> AppResult<Vec<IngredientAmount>> {
        let mut errors = input
            .validate()
            .err()
            .map(|e| collect_field_errors(&e))
            .unwrap_or_default();

        if mode == ValidationMode::Create {
            for (field, present) in [
                ("name", input.name.is_some()),
                ("text", input.text.is_some()),
                ("cooking_time", input.cooking_time.is_some()),
                ("image", input.image.is_some()),
            ] {
                if !present {
                    push(&mut errors, field, REQUIRED);
                }
            }
        }

        if let Some(name) = &input.name {
            check_max_lengths(&mut errors, &[("name", name.as_str(), self.limits.max_recipe_name_length)]);
        }

        if let Some(cooking_time) = input.cooking_time {
            let min = self.limits.min_cooking_time;
            if cooking_time < min {
                push(
                    &mut errors,
                    "cooking_time",
                    format!("Время приготовления должно быть не меньше {min}"),
                );
            }
        }

        let items = match &input.ingredients {
            None => {
                push(&mut errors, "ingredients", "Поле ингредиентов обязательно");
                Vec::new()
            }
            Some(lines) => self.check_lines(lines, &mut errors),
        };

        if errors.is_empty() {
            Ok(items)
        } else {
            Err(AppError::FieldValidation(errors))
        }
    }

    fn check_lines(
        &self,
        lines: &[crate::services::recipe::IngredientAmountInput],
        errors: &mut FieldErrors,
    ) -> Vec<IngredientAmount> {
        if lines.is_empty() {
            push(errors, "ingredients", "Нужен хотя бы один ингредиент");
            return Vec::new();
        }

        let mut seen = HashSet::with_capacity(lines.len());
        if !lines.iter().all(|line| seen.insert(line.id)) {
            push(errors, "ingredients", "Ингредиенты не должны повторяться");
        }

        let min = self.limits.min_ingredient_amount;
        if lines.iter().any(|line| line.amount < min) {
            push(
                errors,
                "ingredients",
                format!("Количество ингредиента должно быть не меньше {min}"),
            );
        }

        lines
            .iter()
            .map(|line| IngredientAmount {
                ingredient_id: line.id,
                amount: line.amount,
            })
            .collect()
    }

    /// Fail unless every requested ingredient ID was found.
    pub fn check_known_ingredients(requested: &[IngredientAmount], found: &[i32]) -> AppResult<()> {
        let found: HashSet<i32> = found.iter().copied().collect();
        let missing: Vec<String> = requested
            .iter()
            .filter(|item| !found.contains(&item.ingredient_id))
            .map(|item| {
                format!(
                    "Недопустимый первичный ключ \"{}\" - объект не существует.",
                    item.ingredient_id
                )
            })
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        let mut errors = FieldErrors::new();
        errors.insert("ingredients".to_string(), missing);
        Err(AppError::FieldValidation(errors))
    }
}

/// Run the input's static rules plus `(field, value, max chars)` checks.
pub fn validate_with_lengths<T: Validate>(
    input: &T,
    lengths: &[(&str, &str, usize)],
) -> AppResult<()> {
    let mut errors = input
        .validate()
        .err()
        .map(|e| collect_field_errors(&e))
        .unwrap_or_default();
    check_max_lengths(&mut errors, lengths);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::FieldValidation(errors))
    }
}

fn check_max_lengths(errors: &mut FieldErrors, lengths: &[(&str, &str, usize)]) {
    for &(field, value, max) in lengths {
        if value.chars().count() > max {
            push(
                errors,
                field,
                format!("Убедитесь, что это значение содержит не более {max} символов."),
            );
        }
    }
}

fn push(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.into());
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::recipe::IngredientAmountInput;

    fn validator() -> RecipeValidator {
        RecipeValidator::new(Limits::default())
    }

    fn line(id: i32, amount: i32) -> IngredientAmountInput {
        IngredientAmountInput { id, amount }
    }

    fn input(ingredients: Option<Vec<IngredientAmountInput>>) -> RecipeInput {
        RecipeInput {
            name: Some("Блины".to_string()),
            text: Some("Смешать и жарить".to_string()),
            cooking_time: Some(20),
            image: Some("data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAIAAACQd1PeAAAADElEQVR4nGP4z8AAAAMBAQDJ/pLvAAAAAElFTkSuQmCC".to_string()),
            ingredients,
        }
    }

    fn fields(err: AppError) -> FieldErrors {
        match err {
            AppError::FieldValidation(fields) => fields,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_valid_payload_returns_lines_in_order() {
        let items = validator()
            .validate(&input(Some(vec![line(3, 200), line(1, 2)])), ValidationMode::Create)
            .unwrap();

        assert_eq!(
            items,
            vec![
                IngredientAmount {
                    ingredient_id: 3,
                    amount: 200
                },
                IngredientAmount {
                    ingredient_id: 1,
                    amount: 2
                },
            ]
        );
    }

    #[test]
    fn test_empty_ingredients_rejected() {
        let err = validator()
            .validate(&input(Some(vec![])), ValidationMode::Create)
            .unwrap_err();
        assert!(fields(err).contains_key("ingredients"));
    }

    #[test]
    fn test_missing_ingredients_rejected_on_update() {
        let mut payload = input(None);
        payload.name = None;
        payload.image = None;

        let errors = fields(
            validator()
                .validate(&payload, ValidationMode::Update)
                .unwrap_err(),
        );
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("ingredients"));
    }

    #[test]
    fn test_duplicate_ingredient_rejected() {
        let err = validator()
            .validate(&input(Some(vec![line(1, 1), line(1, 5)])), ValidationMode::Create)
            .unwrap_err();
        assert_eq!(
            fields(err)["ingredients"],
            vec!["Ингредиенты не должны повторяться".to_string()]
        );
    }

    #[test]
    fn test_amount_below_minimum_rejected() {
        let err = validator()
            .validate(&input(Some(vec![line(1, 0)])), ValidationMode::Create)
            .unwrap_err();
        assert!(fields(err).contains_key("ingredients"));
    }

    #[test]
    fn test_cooking_time_uses_configured_minimum() {
        let strict = RecipeValidator::new(Limits {
            min_cooking_time: 5,
            ..Limits::default()
        });
        let mut payload = input(Some(vec![line(1, 1)]));
        payload.cooking_time = Some(4);

        let err = strict.validate(&payload, ValidationMode::Create).unwrap_err();
        assert!(fields(err).contains_key("cooking_time"));
    }

    #[test]
    fn test_create_requires_every_field() {
        let payload = RecipeInput {
            name: None,
            text: None,
            cooking_time: None,
            image: None,
            ingredients: Some(vec![line(1, 1)]),
        };

        let errors = fields(validator().validate(&payload, ValidationMode::Create).unwrap_err());
        for field in ["name", "text", "cooking_time", "image"] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_name_length_limit() {
        let mut payload = input(Some(vec![line(1, 1)]));
        payload.name = Some("я".repeat(257));

        let err = validator().validate(&payload, ValidationMode::Create).unwrap_err();
        assert!(fields(err).contains_key("name"));
    }

    #[test]
    fn test_unknown_ingredient_reported() {
        let requested = [
            IngredientAmount {
                ingredient_id: 1,
                amount: 1,
            },
            IngredientAmount {
                ingredient_id: 99,
                amount: 1,
            },
        ];

        let err = RecipeValidator::check_known_ingredients(&requested, &[1]).unwrap_err();
        let errors = fields(err);
        assert_eq!(errors["ingredients"].len(), 1);
        assert!(errors["ingredients"][0].contains("99"));
    }
}
