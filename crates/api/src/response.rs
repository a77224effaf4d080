//! API response types.
//!
//! Views are assembled in `foodgram-core`; these types only shape them into
//! JSON and turn storage keys into absolute URLs.

use axum::http::StatusCode;
use foodgram_core::{AuthorWithRecipes, RecipeDetail, RecipeIngredientLine, UserProfile};
use foodgram_db::entities::{ingredient, recipe, user};
use serde::Serialize;

use crate::{extractors::Paging, middleware::AppState};

/// Public user view.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl UserResponse {
    /// Build from a profile.
    #[must_use]
    pub fn new(state: &AppState, profile: UserProfile) -> Self {
        let UserProfile {
            user,
            is_subscribed,
        } = profile;
        Self {
            avatar: user.avatar.as_deref().map(|key| state.media_url(key)),
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// Returned by registration.
#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<user::Model> for CreatedUserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Ingredient view.
#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(ingredient: ingredient::Model) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

/// Ingredient line inside a recipe.
#[derive(Debug, Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredientLine> for RecipeIngredientResponse {
    fn from(line: RecipeIngredientLine) -> Self {
        Self {
            id: line.id,
            name: line.name,
            measurement_unit: line.measurement_unit,
            amount: line.amount,
        }
    }
}

/// Full recipe view.
#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeResponse {
    /// Build from an assembled recipe detail.
    #[must_use]
    pub fn new(state: &AppState, detail: RecipeDetail) -> Self {
        let RecipeDetail {
            recipe,
            author,
            ingredients,
            is_favorited,
            is_in_shopping_cart,
        } = detail;
        Self {
            id: recipe.id,
            author: UserResponse::new(state, author),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            is_favorited,
            is_in_shopping_cart,
            image: state.media_url(&recipe.image),
            name: recipe.name,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Reduced recipe view used in membership responses.
#[derive(Debug, Serialize)]
pub struct MinifiedRecipe {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl MinifiedRecipe {
    #[must_use]
    pub fn new(state: &AppState, recipe: recipe::Model) -> Self {
        Self {
            id: recipe.id,
            image: state.media_url(&recipe.image),
            name: recipe.name,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// A followed author with a preview of their recipes.
#[derive(Debug, Serialize)]
pub struct UserWithRecipes {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<MinifiedRecipe>,
    pub recipes_count: u64,
}

impl UserWithRecipes {
    #[must_use]
    pub fn new(state: &AppState, author: AuthorWithRecipes) -> Self {
        Self {
            user: UserResponse::new(state, author.profile),
            recipes: author
                .recipes
                .into_iter()
                .map(|r| MinifiedRecipe::new(state, r))
                .collect(),
            recipes_count: author.recipes_count,
        }
    }
}

/// Page-number pagination envelope.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    /// Wrap one page of results.
    #[must_use]
    pub fn new(results: Vec<T>, count: u64, paging: &Paging) -> Self {
        Self {
            count,
            next: paging.request.next_link(&paging.current, count),
            previous: paging.request.previous_link(&paging.current),
            results,
        }
    }
}

/// Empty success response.
#[must_use]
pub const fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}
