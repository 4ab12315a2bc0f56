//! services/api/src/web/substitution.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubstitutionRequest {
    #[schema(example = "paneer")]
    pub ingredient: String,
    #[schema(example = "Palak Paneer")]
    pub recipe_name: String,
    /// Ingredients on hand. Defaults to the items detected in the latest analysis.
    pub available: Option<Vec<String>>,
}

#[derive(Serialize, ToSchema)]
pub struct SubstitutionResponse {
    pub suggestion: String,
}

/// POST /substitutions - Suggest a replacement for a missing ingredient
///
/// Always answers 200; when nothing can be suggested the suggestion is a fixed
/// fallback sentence.
#[utoipa::path(
    post,
    path = "/substitutions",
    request_body = SubstitutionRequest,
    responses(
        (status = 200, description = "A one-sentence suggestion", body = SubstitutionResponse)
    )
)]
pub async fn substitution_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubstitutionRequest>,
) -> impl IntoResponse {
    let available = match req.available {
        Some(names) => names,
        None => state
            .tracker
            .latest()
            .await
            .map(|result| result.detected_items.into_iter().map(|i| i.name).collect())
            .unwrap_or_default(),
    };

    let suggestion = state
        .advisor
        .suggest(&req.ingredient, &req.recipe_name, &available)
        .await;
    Json(SubstitutionResponse { suggestion })
}
