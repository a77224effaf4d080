//! Shopping list aggregation.
//!
//! Ingredient rows from every recipe in a user's cart are grouped by
//! `(name, measurement_unit)` and their amounts summed. Lines are ordered by
//! name, then unit, comparing case-insensitively with `ё` sorted as `е`, so
//! the rendered list reads alphabetically and is stable for a given cart.

use std::collections::BTreeMap;
use std::fmt;

use foodgram_db::repositories::CartIngredientRow;

/// First line of every rendered shopping list.
pub const SHOPPING_LIST_HEADER: &str = "Список покупок:";

/// One aggregated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

/// Aggregated shopping list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    /// Group and sum the given rows.
    #[must_use]
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = CartIngredientRow>,
    {
        let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
        for row in rows {
            *totals.entry((row.name, row.measurement_unit)).or_insert(0) += i64::from(row.amount);
        }

        let mut items: Vec<ShoppingListItem> = totals
            .into_iter()
            .map(|((name, measurement_unit), total_amount)| ShoppingListItem {
                name,
                measurement_unit,
                total_amount,
            })
            .collect();
        items.sort_by_cached_key(|item| {
            (
                collation_key(&item.name),
                collation_key(&item.measurement_unit),
            )
        });

        Self { items }
    }

    /// Aggregated lines in output order.
    #[must_use]
    pub fn items(&self) -> &[ShoppingListItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn collation_key(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ё' { 'е' } else { c })
        .collect()
}

impl fmt::Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SHOPPING_LIST_HEADER}\n\n")?;
        for item in &self.items {
            writeln!(
                f,
                "{} ({}) — {}",
                item.name, item.measurement_unit, item.total_amount
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, unit: &str, amount: i32) -> CartIngredientRow {
        CartIngredientRow {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn test_sums_same_ingredient_across_recipes() {
        // Recipe A: 200 g flour, 2 eggs. Recipe B: 300 g flour.
        let list = ShoppingList::from_rows([
            row("мука", "г", 200),
            row("яйцо", "шт", 2),
            row("мука", "г", 300),
        ]);

        assert_eq!(
            list.to_string(),
            "Список покупок:\n\nмука (г) — 500\nяйцо (шт) — 2\n"
        );
    }

    #[test]
    fn test_lines_sorted_by_name() {
        let list = ShoppingList::from_rows([
            row("соль", "г", 5),
            row("вода", "мл", 100),
            row("масло", "г", 10),
        ]);

        let names: Vec<_> = list.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["вода", "масло", "соль"]);
    }

    #[test]
    fn test_sort_ignores_case_and_places_yo_with_ye() {
        let list = ShoppingList::from_rows([
            row("яблоко", "шт", 1),
            row("ёрш", "шт", 1),
            row("Авокадо", "шт", 1),
            row("ель", "г", 1),
            row("банан", "шт", 1),
        ]);

        let names: Vec<_> = list.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Авокадо", "банан", "ель", "ёрш", "яблоко"]);
    }

    #[test]
    fn test_different_units_stay_separate() {
        let list = ShoppingList::from_rows([row("сахар", "г", 100), row("сахар", "ст. л.", 2)]);

        assert_eq!(list.items().len(), 2);
        assert_eq!(list.items()[0].measurement_unit, "г");
    }

    #[test]
    fn test_empty_cart_is_header_only() {
        let list = ShoppingList::from_rows(Vec::new());

        assert!(list.is_empty());
        assert_eq!(list.to_string(), "Список покупок:\n\n");
    }

    #[test]
    fn test_large_totals_do_not_overflow() {
        let list = ShoppingList::from_rows([row("мука", "г", i32::MAX), row("мука", "г", i32::MAX)]);
        assert_eq!(list.items()[0].total_amount, 2 * i64::from(i32::MAX));
    }
}
