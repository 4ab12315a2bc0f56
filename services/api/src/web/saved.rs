//! services/api/src/web/saved.rs
//!
//! The personal cookbook: listing and toggling saved recipes.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use kitchen_king_core::{Recipe, User};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::rest::{reject, ErrorBody, HandlerError};
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct ToggleResponse {
    /// Whether the recipe is saved after the toggle.
    pub saved: bool,
}

/// GET /recipes/saved - The current user's saved recipes
#[utoipa::path(
    get,
    path = "/recipes/saved",
    responses(
        (status = 200, description = "Saved recipes in the order they were saved", body = Vec<serde_json::Value>)
    )
)]
pub async fn list_saved_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let set = state.saved.current().await;
    Json(set.recipes().to_vec())
}

/// POST /recipes/saved/toggle - Save a recipe, or un-save it if already saved
#[utoipa::path(
    post,
    path = "/recipes/saved/toggle",
    request_body(content = serde_json::Value, description = "The recipe as returned by the analysis"),
    responses(
        (status = 200, description = "Toggle applied and persisted", body = ToggleResponse),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn toggle_saved_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(recipe): Json<Recipe>,
) -> Result<impl IntoResponse, HandlerError> {
    let language = state.context.language().await;
    let saved = state
        .saved
        .toggle(&user.username, &recipe)
        .await
        .map_err(|e| reject(e, language))?;
    Ok(Json(ToggleResponse { saved }))
}
