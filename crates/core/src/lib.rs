//! Core business logic for foodgram-rs.

pub mod filter;
pub mod policy;
pub mod services;
pub mod shopping_list;
pub mod validation;

pub use filter::RecipeFilter;
pub use policy::{Access, OwnershipPolicy};
pub use services::*;
pub use shopping_list::{SHOPPING_LIST_HEADER, ShoppingList, ShoppingListItem};
pub use validation::{RecipeValidator, validate_with_lengths};
