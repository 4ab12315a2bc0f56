//! crates/kitchen_king_core/src/testing.rs
//!
//! Builders shared by the unit tests in this crate.

use crate::domain::{Difficulty, Recipe};

pub(crate) fn recipe(id: &str, name_en: &str, name_hi: &str) -> Recipe {
    Recipe {
        id: id.to_string(),
        name_en: name_en.to_string(),
        name_hi: name_hi.to_string(),
        time: "20 mins".to_string(),
        difficulty: Difficulty::Easy,
        why_fit: "Uses what is already in the fridge".to_string(),
        ingredients_en: vec!["spinach".to_string()],
        ingredients_hi: vec!["पालक".to_string()],
        steps_en: vec!["Chop".to_string()],
        steps_hi: vec!["काटें".to_string()],
        calories: "250 kcal".to_string(),
        serving_size: "2 people".to_string(),
        is_quick: false,
        is_no_gas: false,
    }
}
