//! Repository layer.
//!
//! One repository per aggregate; each owns a shared connection handle and
//! converts `sea_orm` errors into [`foodgram_common::AppError`].

mod favorite;
mod ingredient;
mod recipe;
mod shopping_cart;
mod subscription;
mod user;

pub use favorite::FavoriteRepository;
pub use ingredient::IngredientRepository;
pub use recipe::{IngredientAmount, RecipeRepository};
pub use shopping_cart::{CartIngredientRow, ShoppingCartRepository};
pub use subscription::SubscriptionRepository;
pub use user::UserRepository;
