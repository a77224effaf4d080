//! Recipe service.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use foodgram_common::{
    AppError, AppResult, DataUrlImage, IdGenerator, Limits, PageRequest, StorageBackend,
    generate_storage_key,
};
use foodgram_db::{
    entities::{recipe, user},
    repositories::{
        FavoriteRepository, IngredientAmount, IngredientRepository, RecipeRepository,
        ShoppingCartRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::filter::RecipeFilter;
use crate::policy::{Access, OwnershipPolicy};
use crate::services::user::{UserProfile, UserService};
use crate::validation::{RecipeValidator, ValidationMode};

/// One `{id, amount}` entry of a recipe payload.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IngredientAmountInput {
    pub id: i32,
    pub amount: i32,
}

/// Recipe create/update payload. On update, absent fields keep their values.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RecipeInput {
    #[validate(length(min = 1, message = "Это поле не может быть пустым."))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "Это поле не может быть пустым."))]
    pub text: Option<String>,

    pub cooking_time: Option<i32>,

    /// Base64 data URL.
    pub image: Option<String>,

    pub ingredients: Option<Vec<IngredientAmountInput>>,
}

/// An ingredient as listed in a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredientLine {
    /// Ingredient ID.
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// A recipe with everything its full representation needs.
#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: recipe::Model,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredientLine>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Recipe service for business logic.
#[derive(Clone)]
pub struct RecipeService {
    recipe_repo: RecipeRepository,
    ingredient_repo: IngredientRepository,
    user_repo: UserRepository,
    favorite_repo: FavoriteRepository,
    cart_repo: ShoppingCartRepository,
    users: UserService,
    storage: Arc<dyn StorageBackend>,
    validator: RecipeValidator,
    id_gen: IdGenerator,
}

impl RecipeService {
    /// Create a new recipe service.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        recipe_repo: RecipeRepository,
        ingredient_repo: IngredientRepository,
        user_repo: UserRepository,
        favorite_repo: FavoriteRepository,
        cart_repo: ShoppingCartRepository,
        users: UserService,
        storage: Arc<dyn StorageBackend>,
        limits: Limits,
    ) -> Self {
        Self {
            recipe_repo,
            ingredient_repo,
            user_repo,
            favorite_repo,
            cart_repo,
            users,
            storage,
            validator: RecipeValidator::new(limits),
            id_gen: IdGenerator::new(),
        }
    }

    /// List recipes, newest first.
    pub async fn list(
        &self,
        viewer: Option<&user::Model>,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<RecipeDetail>, u64)> {
        let condition = filter.condition(viewer.map(|v| v.id));
        let (recipes, count) = self.recipe_repo.list(condition, page).await?;

        Ok((self.details(viewer, recipes).await?, count))
    }

    /// Get one recipe.
    pub async fn get(&self, viewer: Option<&user::Model>, id: i32) -> AppResult<RecipeDetail> {
        let recipe = self.recipe_repo.get_by_id(id).await?;
        self.detail(viewer, recipe).await
    }

    /// Publish a new recipe by `author`.
    pub async fn create(&self, author: &user::Model, input: RecipeInput) -> AppResult<RecipeDetail> {
        let items = self.validator.validate(&input, ValidationMode::Create)?;
        self.ensure_ingredients_exist(&items).await?;

        let image = DataUrlImage::parse("image", input.image.as_deref().unwrap_or_default())?;
        let key = self.store_image(&image).await?;

        let model = recipe::ActiveModel {
            author_id: Set(author.id),
            name: Set(input.name.unwrap_or_default()),
            image: Set(key.clone()),
            text: Set(input.text.unwrap_or_default()),
            cooking_time: Set(input.cooking_time.unwrap_or_default()),
            pub_date: Set(chrono::Utc::now().into()),
            short_link: Set(self.id_gen.generate_short_link()),
            ..Default::default()
        };

        let recipe = match self.recipe_repo.create_with_ingredients(model, &items).await {
            Ok(recipe) => recipe,
            Err(e) => {
                self.remove_file(&key).await;
                return Err(e);
            }
        };

        tracing::info!(recipe_id = recipe.id, author_id = author.id, "Recipe created");
        self.detail(Some(author), recipe).await
    }

    /// Update a recipe and replace its ingredient list.
    pub async fn update(
        &self,
        caller: &user::Model,
        id: i32,
        input: RecipeInput,
    ) -> AppResult<RecipeDetail> {
        let existing = self.recipe_repo.get_by_id(id).await?;
        OwnershipPolicy::check_object(Some(caller), Access::Write, &existing)?;

        let items = self.validator.validate(&input, ValidationMode::Update)?;
        self.ensure_ingredients_exist(&items).await?;

        let new_key = match input.image.as_deref() {
            Some(raw) => Some(self.store_image(&DataUrlImage::parse("image", raw)?).await?),
            None => None,
        };

        let mut model: recipe::ActiveModel = existing.clone().into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(text) = input.text {
            model.text = Set(text);
        }
        if let Some(cooking_time) = input.cooking_time {
            model.cooking_time = Set(cooking_time);
        }
        if let Some(key) = &new_key {
            model.image = Set(key.clone());
        }

        let recipe = match self.recipe_repo.update_with_ingredients(model, &items).await {
            Ok(recipe) => recipe,
            Err(e) => {
                if let Some(key) = &new_key {
                    self.remove_file(key).await;
                }
                return Err(e);
            }
        };

        if new_key.is_some() {
            self.remove_file(&existing.image).await;
        }

        tracing::info!(recipe_id = recipe.id, "Recipe updated");
        self.detail(Some(caller), recipe).await
    }

    /// Delete a recipe.
    pub async fn delete(&self, caller: &user::Model, id: i32) -> AppResult<()> {
        let recipe = self.recipe_repo.get_by_id(id).await?;
        OwnershipPolicy::check_object(Some(caller), Access::Write, &recipe)?;

        self.recipe_repo.delete(recipe.id).await?;
        self.remove_file(&recipe.image).await;

        tracing::info!(recipe_id = recipe.id, "Recipe deleted");
        Ok(())
    }

    /// Short link token of a recipe.
    pub async fn get_link(&self, id: i32) -> AppResult<String> {
        Ok(self.recipe_repo.get_by_id(id).await?.short_link)
    }

    /// Resolve a short link token to its recipe.
    pub async fn resolve_short_link(&self, token: &str) -> AppResult<recipe::Model> {
        self.recipe_repo
            .find_by_short_link(token)
            .await?
            .ok_or_else(|| AppError::RecipeNotFound(format!("short link {token}")))
    }

    /// Build the full representation of one recipe.
    pub async fn detail(
        &self,
        viewer: Option<&user::Model>,
        recipe: recipe::Model,
    ) -> AppResult<RecipeDetail> {
        let id = recipe.id;
        self.details(viewer, vec![recipe])
            .await?
            .pop()
            .ok_or_else(|| AppError::RecipeNotFound(id.to_string()))
    }

    /// Build full representations for a batch of recipes, keeping their order.
    pub async fn details(
        &self,
        viewer: Option<&user::Model>,
        recipes: Vec<recipe::Model>,
    ) -> AppResult<Vec<RecipeDetail>> {
        if recipes.is_empty() {
            return Ok(vec![]);
        }

        let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        let mut author_ids: Vec<i32> = recipes.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors = self.user_repo.find_by_ids(&author_ids).await?;
        let authors: HashMap<i32, UserProfile> = self
            .users
            .profiles(viewer, authors)
            .await?
            .into_iter()
            .map(|p| (p.user.id, p))
            .collect();

        let mut lines: HashMap<i32, Vec<RecipeIngredientLine>> = HashMap::new();
        for (row, ingredient) in self.recipe_repo.find_ingredients(&recipe_ids).await? {
            lines.entry(row.recipe_id).or_default().push(RecipeIngredientLine {
                id: ingredient.id,
                name: ingredient.name,
                measurement_unit: ingredient.measurement_unit,
                amount: row.amount,
            });
        }

        let (favorited, in_cart) = match viewer {
            Some(viewer) => (
                self.favorite_repo
                    .favorited_among(viewer.id, &recipe_ids)
                    .await?,
                self.cart_repo.in_cart_among(viewer.id, &recipe_ids).await?,
            ),
            None => (HashSet::new(), HashSet::new()),
        };

        recipes
            .into_iter()
            .map(|recipe| {
                let author = authors
                    .get(&recipe.author_id)
                    .cloned()
                    .ok_or_else(|| AppError::UserNotFound(recipe.author_id.to_string()))?;
                Ok(RecipeDetail {
                    ingredients: lines.remove(&recipe.id).unwrap_or_default(),
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                    author,
                    recipe,
                })
            })
            .collect()
    }

    async fn ensure_ingredients_exist(
        &self,
        items: &[IngredientAmount],
    ) -> AppResult<()> {
        let ids: Vec<i32> = items.iter().map(|i| i.ingredient_id).collect();
        let found: Vec<i32> = self
            .ingredient_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|i| i.id)
            .collect();
        RecipeValidator::check_known_ingredients(items, &found)
    }

    async fn store_image(&self, image: &DataUrlImage) -> AppResult<String> {
        let key = generate_storage_key("recipes", &image.extension);
        self.storage
            .upload(&key, &image.bytes, &image.content_type)
            .await?;
        Ok(key)
    }

    async fn remove_file(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to delete stored file");
        }
    }
}
