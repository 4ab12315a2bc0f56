//! crates/kitchen_king_core/src/lib.rs
//!
//! Kitchen King core: the domain model, the ports adapters plug into, and the
//! components that turn a fridge photo or an ingredient list into recipes.

pub mod context;
pub mod domain;
pub mod error;
pub mod fakes;
pub mod filter;
pub mod navigation;
pub mod normalizer;
pub mod pipeline;
pub mod ports;
pub mod request;
pub mod saved;
pub mod substitution;

#[cfg(test)]
mod testing;

pub use context::AppContext;
pub use domain::{
    AnalysisResult, Category, DetectedItem, Diet, Difficulty, ImageInput, InferenceRequest,
    Language, Preferences, Recipe, User,
};
pub use error::{AuthFailure, CoreError};
pub use filter::{filter_recipes, group_by_category, RecipeFilter};
pub use navigation::{HomeEffect, Navigator, View};
pub use pipeline::{AnalysisPipeline, AnalysisSnapshot, AnalysisState, AnalysisTracker};
pub use ports::{InferenceService, KeyValueStore, PortError, PortResult};
pub use request::{decode_image, RequestBuilder};
pub use saved::{SavedRecipeSet, SavedRecipeStore};
pub use substitution::{SubstitutionAdvisor, NO_SUBSTITUTION};
