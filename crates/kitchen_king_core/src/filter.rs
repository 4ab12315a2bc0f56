//! crates/kitchen_king_core/src/filter.rs
//!
//! Pure views derived from an `AnalysisResult`: recipe filtering and
//! grouping of detected items by category.

use serde::Deserialize;

use crate::domain::{Category, DetectedItem, Recipe};

/// The two independent recipe filters. An inactive flag imposes no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct RecipeFilter {
    #[serde(default)]
    pub quick: bool,
    #[serde(default)]
    pub no_gas: bool,
}

impl RecipeFilter {
    pub fn is_active(&self) -> bool {
        self.quick || self.no_gas
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        (!self.quick || recipe.is_quick) && (!self.no_gas || recipe.is_no_gas)
    }

    pub fn apply<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        recipes.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Keeps the recipes that pass every active filter, in their original order.
pub fn filter_recipes(recipes: &[Recipe], filter_quick: bool, filter_no_gas: bool) -> Vec<Recipe> {
    let filter = RecipeFilter {
        quick: filter_quick,
        no_gas: filter_no_gas,
    };
    filter.apply(recipes).into_iter().cloned().collect()
}

/// Buckets items by category in display order, dropping empty buckets.
pub fn group_by_category(items: &[DetectedItem]) -> Vec<(Category, Vec<DetectedItem>)> {
    Category::DISPLAY_ORDER
        .iter()
        .filter_map(|category| {
            let bucket: Vec<DetectedItem> = items
                .iter()
                .filter(|item| item.category == *category)
                .cloned()
                .collect();
            (!bucket.is_empty()).then_some((*category, bucket))
        })
        .collect()
}
