//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use kitchen_king_core::{
    AnalysisPipeline, AnalysisTracker, AppContext, CoreError, InferenceService, KeyValueStore,
    Navigator, SavedRecipeStore, SubstitutionAdvisor,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub context: Arc<AppContext>,
    pub pipeline: AnalysisPipeline,
    pub tracker: AnalysisTracker,
    pub saved: SavedRecipeStore,
    pub advisor: SubstitutionAdvisor,
    pub navigator: Mutex<Navigator>,
}

impl AppState {
    /// Wires the core components over the given adapters and restores the
    /// previous session, including that user's saved recipes.
    pub async fn build(
        store: Arc<dyn KeyValueStore>,
        inference: Arc<dyn InferenceService>,
    ) -> Result<Self, CoreError> {
        let context = Arc::new(AppContext::start(store.clone()).await?);
        let saved = SavedRecipeStore::new(store);

        if let Some(user) = context.current_user().await {
            saved.load(&user.username).await?;
            info!(username = %user.username, "Restored previous session.");
        }

        Ok(Self {
            context,
            pipeline: AnalysisPipeline::new(inference.clone()),
            tracker: AnalysisTracker::new(),
            saved,
            advisor: SubstitutionAdvisor::new(inference),
            navigator: Mutex::new(Navigator::new()),
        })
    }
}
