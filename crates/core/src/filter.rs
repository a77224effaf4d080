//! Recipe list filtering.

use foodgram_common::{AppError, AppResult};
use foodgram_db::entities::{Favorite, ShoppingCart, favorite, recipe, shopping_cart};
use sea_orm::{ColumnTrait, Condition, sea_query::Query};

/// Filters accepted by the recipe list. All present filters are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Exact author ID.
    pub author: Option<i32>,
    /// Only recipes the caller has favorited.
    pub is_favorited: bool,
    /// Only recipes in the caller's shopping cart.
    pub is_in_shopping_cart: bool,
}

impl RecipeFilter {
    /// Build a filter from raw query values. Flags are on only for the literal `1`.
    pub fn from_query(
        author: Option<&str>,
        is_favorited: Option<&str>,
        is_in_shopping_cart: Option<&str>,
    ) -> AppResult<Self> {
        let author = match author.map(str::trim).filter(|a| !a.is_empty()) {
            None => None,
            Some(raw) => Some(
                raw.parse::<i32>()
                    .map_err(|_| AppError::field("author", "Введите число."))?,
            ),
        };

        Ok(Self {
            author,
            is_favorited: is_favorited == Some("1"),
            is_in_shopping_cart: is_in_shopping_cart == Some("1"),
        })
    }

    /// SQL condition for the filter. Flag filters are ignored without a viewer.
    #[must_use]
    pub fn condition(&self, viewer_id: Option<i32>) -> Condition {
        let mut condition = Condition::all();

        if let Some(author) = self.author {
            condition = condition.add(recipe::Column::AuthorId.eq(author));
        }

        if let Some(viewer_id) = viewer_id {
            if self.is_favorited {
                condition = condition.add(
                    recipe::Column::Id.in_subquery(
                        Query::select()
                            .column(favorite::Column::RecipeId)
                            .from(Favorite)
                            .and_where(favorite::Column::UserId.eq(viewer_id))
                            .to_owned(),
                    ),
                );
            }
            if self.is_in_shopping_cart {
                condition = condition.add(
                    recipe::Column::Id.in_subquery(
                        Query::select()
                            .column(shopping_cart::Column::RecipeId)
                            .from(ShoppingCart)
                            .and_where(shopping_cart::Column::UserId.eq(viewer_id))
                            .to_owned(),
                    ),
                );
            }
        }

        condition
    }
}
