//! crates/kitchen_king_core/src/saved.rs
//!
//! The per-user bookmark set ("My Cookbook").
//!
//! Only one user's set is held in memory at a time. Each user's set lives in its
//! own storage slot, and the read-modify-persist cycle of `toggle` runs under a
//! single async mutex so no other caller can observe a half-applied change.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::Recipe;
use crate::error::CoreError;
use crate::ports::KeyValueStore;

/// The storage slot holding one user's saved recipes.
pub fn saved_recipes_key(username: &str) -> String {
    format!("saved_recipes:{}", username)
}

/// The recipes one user has bookmarked, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedRecipeSet {
    recipes: Vec<Recipe>,
}

impl SavedRecipeSet {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    pub fn contains(&self, recipe: &Recipe) -> bool {
        self.recipes.iter().any(|r| r.same_entity(recipe))
    }

    /// Removes every entry matching `recipe`, or appends it if none does.
    /// Returns whether the recipe is saved afterwards.
    pub fn toggle(&mut self, recipe: &Recipe) -> bool {
        if self.contains(recipe) {
            self.recipes.retain(|r| !r.same_entity(recipe));
            false
        } else {
            self.recipes.push(recipe.clone());
            true
        }
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[derive(Debug)]
struct ActiveSet {
    username: String,
    set: SavedRecipeSet,
}

/// Loads, toggles, and persists the active user's `SavedRecipeSet`.
pub struct SavedRecipeStore {
    store: Arc<dyn KeyValueStore>,
    active: Mutex<Option<ActiveSet>>,
}

impl SavedRecipeStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            active: Mutex::new(None),
        }
    }

    /// Replaces whatever is in memory with `username`'s persisted set.
    pub async fn load(&self, username: &str) -> Result<SavedRecipeSet, CoreError> {
        let mut active = self.active.lock().await;
        let set = self.read_slot(username).await?;
        *active = Some(ActiveSet {
            username: username.to_string(),
            set: set.clone(),
        });
        info!(username, saved = set.len(), "Loaded saved recipes.");
        Ok(set)
    }

    /// Flips the saved state of `recipe` for `username` and persists the result
    /// before returning. Returns whether the recipe is saved afterwards.
    pub async fn toggle(&self, username: &str, recipe: &Recipe) -> Result<bool, CoreError> {
        let mut active = self.active.lock().await;

        let mut set = match active.as_ref() {
            Some(current) if current.username == username => current.set.clone(),
            _ => self.read_slot(username).await?,
        };
        let now_saved = set.toggle(recipe);

        let encoded = serde_json::to_string(set.recipes())
            .map_err(|e| CoreError::Storage(format!("failed to encode saved recipes: {}", e)))?;
        self.store
            .set(&saved_recipes_key(username), &encoded)
            .await?;

        info!(
            username,
            recipe = %recipe.name_en,
            now_saved,
            "Toggled saved recipe."
        );
        *active = Some(ActiveSet {
            username: username.to_string(),
            set,
        });
        Ok(now_saved)
    }

    /// Whether `recipe` is in the currently loaded set.
    pub async fn is_saved(&self, recipe: &Recipe) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|current| current.set.contains(recipe))
            .unwrap_or(false)
    }

    /// The currently loaded set, empty if nobody is loaded.
    pub async fn current(&self) -> SavedRecipeSet {
        self.active
            .lock()
            .await
            .as_ref()
            .map(|current| current.set.clone())
            .unwrap_or_default()
    }

    /// Drops the in-memory set. Persisted data is untouched.
    pub async fn discard(&self) {
        *self.active.lock().await = None;
    }

    async fn read_slot(&self, username: &str) -> Result<SavedRecipeSet, CoreError> {
        let Some(raw) = self.store.get(&saved_recipes_key(username)).await? else {
            return Ok(SavedRecipeSet::default());
        };
        match serde_json::from_str::<Vec<Recipe>>(&raw) {
            Ok(recipes) => Ok(SavedRecipeSet::new(recipes)),
            Err(e) => {
                warn!(username, "Failed to parse saved recipes, starting empty: {}", e);
                Ok(SavedRecipeSet::default())
            }
        }
    }
}
