//! Business logic services.

#![allow(missing_docs)]

pub mod favorite;
pub mod ingredient;
pub mod recipe;
pub mod shopping_cart;
pub mod subscription;
pub mod user;

#[cfg(test)]
pub(crate) mod test_support;

pub use favorite::FavoriteService;
pub use ingredient::{IngredientRecord, IngredientService};
pub use recipe::{
    IngredientAmountInput, RecipeDetail, RecipeIngredientLine, RecipeInput, RecipeService,
};
pub use shopping_cart::ShoppingCartService;
pub use subscription::{AuthorWithRecipes, SubscriptionService, parse_recipes_limit};
pub use user::{CreateUserInput, LoginInput, SetPasswordInput, UserProfile, UserService};
