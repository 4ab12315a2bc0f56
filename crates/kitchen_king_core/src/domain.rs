//! crates/kitchen_king_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs mirror the JSON documents exchanged with the inference service
//! and the values persisted in the key-value store.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

//=========================================================================================
// Detected Items
//=========================================================================================

/// The fixed set of buckets a detected item can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Vegetables,
    Dairy,
    Fruits,
    Proteins,
    #[serde(other)]
    Others,
}

impl Category {
    /// Display order used when grouping detected items.
    pub const DISPLAY_ORDER: [Category; 5] = [
        Category::Vegetables,
        Category::Dairy,
        Category::Fruits,
        Category::Proteins,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vegetables => "Vegetables",
            Category::Dairy => "Dairy",
            Category::Fruits => "Fruits",
            Category::Proteins => "Proteins",
            Category::Others => "Others",
        }
    }
}

/// One ingredient the inference service recognised in the photo or the typed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedItem {
    pub name: String,
    pub category: Category,
    pub freshness: String,
}

//=========================================================================================
// Recipes
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
}

/// A bilingual recipe suggestion.
///
/// `id` is assigned by the inference service and is not stable across calls, so
/// bookmarks compare recipes with [`Recipe::same_entity`] instead of `==`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name_en: String,
    pub name_hi: String,
    pub time: String,
    pub difficulty: Difficulty,
    pub why_fit: String,
    pub ingredients_en: Vec<String>,
    pub ingredients_hi: Vec<String>,
    pub steps_en: Vec<String>,
    pub steps_hi: Vec<String>,
    pub calories: String,
    pub serving_size: String,
    #[serde(default)]
    pub is_quick: bool,
    #[serde(default)]
    pub is_no_gas: bool,
}

impl Recipe {
    /// Fallback identity: same `id`, or the same English and Hindi names.
    ///
    /// Every save-state comparison in the crate goes through this function.
    pub fn same_entity(&self, other: &Recipe) -> bool {
        self.id == other.id || (self.name_en == other.name_en && self.name_hi == other.name_hi)
    }
}

/// Everything one successful analysis run produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub detected_items: Vec<DetectedItem>,
    pub recipes: Vec<Recipe>,
    pub food_saving_tips: Vec<String>,
    pub safety_notes: Vec<String>,
}

//=========================================================================================
// Preferences
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diet {
    Veg,
    #[serde(rename = "Non-Veg")]
    NonVeg,
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diet::Veg => write!(f, "Veg"),
            Diet::NonVeg => write!(f, "Non-Veg"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub diet: Diet,
    /// Minutes the user can spend cooking. The UI offers 10..=120.
    pub time_available: u32,
    pub servings: u32,
}

impl Preferences {
    pub const MIN_TIME: u32 = 10;
    pub const MAX_TIME: u32 = 120;
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            diet: Diet::Veg,
            time_available: 30,
            servings: 2,
        }
    }
}

//=========================================================================================
// Inference Request
//=========================================================================================

/// A decoded image ready to be attached inline to an inference request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub mime_type: String,
    pub data: Bytes,
}

/// The fully composed request handed to the `InferenceService` port.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub instruction: String,
    pub image: Option<ImageInput>,
    pub response_schema: serde_json::Value,
}

//=========================================================================================
// Session
//=========================================================================================

// Represents the logged-in user of this device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::En),
            "hi" => Some(Language::Hi),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::recipe;

    #[test]
    fn same_entity_matches_on_id_alone() {
        let a = recipe("r1", "Palak Paneer", "पालक पनीर");
        let b = recipe("r1", "Spinach Curry", "पालक करी");
        assert!(a.same_entity(&b));
    }

    #[test]
    fn same_entity_matches_on_name_pair_when_ids_differ() {
        let a = recipe("r1", "Palak Paneer", "पालक पनीर");
        let b = recipe("r9", "Palak Paneer", "पालक पनीर");
        assert!(a.same_entity(&b));
        assert!(b.same_entity(&a));
    }

    #[test]
    fn same_entity_needs_both_names() {
        let a = recipe("r1", "Palak Paneer", "पालक पनीर");
        let b = recipe("r2", "Palak Paneer", "पालक टोफू");
        assert!(!a.same_entity(&b));
    }

    #[test]
    fn diet_uses_hyphenated_wire_name() {
        assert_eq!(serde_json::to_string(&Diet::NonVeg).unwrap(), "\"Non-Veg\"");
        assert_eq!(Diet::NonVeg.to_string(), "Non-Veg");
        let parsed: Diet = serde_json::from_str("\"Veg\"").unwrap();
        assert_eq!(parsed, Diet::Veg);
    }

    #[test]
    fn language_codes_round_trip() {
        assert_eq!(Language::from_code("hi"), Some(Language::Hi));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::default().code(), "en");
    }
}
