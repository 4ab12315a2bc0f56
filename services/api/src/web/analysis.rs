//! services/api/src/web/analysis.rs
//!
//! Endpoints that start an analysis (photo, typed text, voice transcript) and
//! the read model the analysis screen renders from.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use kitchen_king_core::{
    decode_image, group_by_category, AnalysisResult, AnalysisState, CoreError, DetectedItem,
    ImageInput, Language, Preferences, Recipe, RecipeFilter, User,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::web::rest::{reject, ErrorBody, HandlerError};
use crate::web::settings::PreferencesRequest;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// A fridge photo as a `data:<mime>;base64,...` URI (or bare base64 JPEG).
#[derive(Deserialize, ToSchema)]
pub struct ImageAnalysisRequest {
    pub image: String,
    /// Replaces the session's default preferences before this run.
    pub preferences: Option<PreferencesRequest>,
}

#[derive(Deserialize, ToSchema)]
pub struct TextAnalysisRequest {
    #[schema(example = "spinach, paneer, two tomatoes")]
    pub ingredients: String,
    pub preferences: Option<PreferencesRequest>,
}

#[derive(Deserialize, ToSchema)]
pub struct VoiceAnalysisRequest {
    pub transcript: String,
    pub preferences: Option<PreferencesRequest>,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryGroup {
    #[schema(example = "Vegetables")]
    pub category: String,
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<DetectedItem>,
}

#[derive(Serialize, ToSchema)]
pub struct RecipeView {
    #[schema(value_type = Object)]
    pub recipe: Recipe,
    pub saved: bool,
}

/// Everything the analysis screen shows. Recipes are already filtered.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisView {
    #[schema(example = "succeeded")]
    pub state: String,
    /// The localized message of the last failure, if the last run failed.
    pub error: Option<String>,
    pub busy: bool,
    pub updated_at: DateTime<Utc>,
    pub detected_groups: Vec<CategoryGroup>,
    pub recipes: Vec<RecipeView>,
    pub food_saving_tips: Vec<String>,
    pub safety_notes: Vec<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /analysis/image - Analyze a fridge photo
#[utoipa::path(
    post,
    path = "/analysis/image",
    request_body = ImageAnalysisRequest,
    responses(
        (status = 200, description = "Analysis finished", body = AnalysisView),
        (status = 400, description = "Image could not be decoded", body = ErrorBody),
        (status = 409, description = "Another analysis is in progress", body = ErrorBody),
        (status = 502, description = "Inference failed or returned an invalid payload", body = ErrorBody)
    )
)]
pub async fn analyze_image_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<ImageAnalysisRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let language = state.context.language().await;
    let image = decode_image(&req.image).map_err(|e| reject(e, language))?;
    let preferences = resolve_preferences(&state, req.preferences).await;

    state
        .tracker
        .begin_submit()
        .await
        .map_err(|e| reject(e, language))?;
    info!(username = %user.username, bytes = image.data.len(), "Photo analysis requested.");
    run_detached(state, Submission::Photo(image), preferences, language).await
}

/// POST /analysis/text - Analyze a typed ingredient list
#[utoipa::path(
    post,
    path = "/analysis/text",
    request_body = TextAnalysisRequest,
    responses(
        (status = 200, description = "Analysis finished", body = AnalysisView),
        (status = 400, description = "Ingredient list is empty", body = ErrorBody),
        (status = 409, description = "Another analysis is in progress", body = ErrorBody),
        (status = 502, description = "Inference failed or returned an invalid payload", body = ErrorBody)
    )
)]
pub async fn analyze_text_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<TextAnalysisRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let language = state.context.language().await;
    require_text(&req.ingredients, language)?;
    let preferences = resolve_preferences(&state, req.preferences).await;

    state
        .tracker
        .begin_submit()
        .await
        .map_err(|e| reject(e, language))?;
    info!(username = %user.username, "Text analysis requested.");
    run_detached(state, Submission::Text(req.ingredients), preferences, language).await
}

/// POST /analysis/voice - Analyze a voice transcript
///
/// Voice input is not held back by a running analysis; whichever run finishes
/// last is the one shown.
#[utoipa::path(
    post,
    path = "/analysis/voice",
    request_body = VoiceAnalysisRequest,
    responses(
        (status = 200, description = "Analysis finished", body = AnalysisView),
        (status = 400, description = "Transcript is empty", body = ErrorBody),
        (status = 502, description = "Inference failed or returned an invalid payload", body = ErrorBody)
    )
)]
pub async fn analyze_voice_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<VoiceAnalysisRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let language = state.context.language().await;
    require_text(&req.transcript, language)?;
    let preferences = resolve_preferences(&state, req.preferences).await;

    state.tracker.begin_unguarded().await;
    info!(username = %user.username, "Voice analysis requested.");
    run_detached(state, Submission::Text(req.transcript), preferences, language).await
}

/// GET /analysis - The latest analysis, filtered
#[utoipa::path(
    get,
    path = "/analysis",
    params(
        ("quick" = Option<bool>, Query, description = "Only recipes marked quick"),
        ("no_gas" = Option<bool>, Query, description = "Only recipes needing no gas or oven")
    ),
    responses(
        (status = 200, description = "Current analysis state", body = AnalysisView)
    )
)]
pub async fn get_analysis_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RecipeFilter>,
) -> impl IntoResponse {
    Json(analysis_view(&state, filter).await)
}

/// DELETE /analysis - Discard the current analysis
#[utoipa::path(
    delete,
    path = "/analysis",
    responses(
        (status = 204, description = "Analysis cleared")
    )
)]
pub async fn reset_analysis_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.tracker.reset().await;
    state.navigator.lock().await.reset();
    StatusCode::NO_CONTENT
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Preferences sent with a run become the session default for later runs.
async fn resolve_preferences(state: &AppState, requested: Option<PreferencesRequest>) -> Preferences {
    match requested {
        Some(req) => {
            let preferences: Preferences = req.into();
            state.context.set_preferences(preferences).await;
            preferences
        }
        None => state.context.preferences().await,
    }
}

/// Refuses blank input before the lifecycle is touched.
fn require_text(text: &str, language: Language) -> Result<(), HandlerError> {
    if text.trim().is_empty() {
        return Err(reject(
            CoreError::InputValidation("no ingredients given".to_string()),
            language,
        ));
    }
    Ok(())
}

enum Submission {
    Photo(ImageInput),
    Text(String),
}

/// Runs the pipeline on its own task and answers with the refreshed view.
///
/// The task records the outcome itself, so a client that disconnects
/// mid-inference cannot leave the tracker stuck in `Requesting`.
async fn run_detached(
    state: Arc<AppState>,
    submission: Submission,
    preferences: Preferences,
    language: Language,
) -> Result<Json<AnalysisView>, HandlerError> {
    let task_state = state.clone();
    let task = tokio::spawn(async move {
        let outcome = match submission {
            Submission::Photo(image) => task_state.pipeline.analyze_image(image, preferences).await,
            Submission::Text(text) => task_state.pipeline.analyze_text(&text, preferences).await,
        };
        record(&task_state, &outcome, language).await;
        outcome
    });

    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            let err = CoreError::Inference(format!("analysis task aborted: {}", e));
            state
                .tracker
                .finish(&Err(err.user_message(language).to_string()))
                .await;
            Err(err)
        }
    };

    match outcome {
        Ok(_) => Ok(Json(analysis_view(&state, RecipeFilter::default()).await)),
        Err(e) => Err(reject(e, language)),
    }
}

async fn record(state: &AppState, outcome: &Result<AnalysisResult, CoreError>, language: Language) {
    match outcome {
        Ok(result) => {
            state.tracker.finish(&Ok(result.clone())).await;
            state.navigator.lock().await.show_analysis();
        }
        Err(e) => {
            state
                .tracker
                .finish(&Err(e.user_message(language).to_string()))
                .await;
        }
    }
}

pub async fn analysis_view(state: &AppState, filter: RecipeFilter) -> AnalysisView {
    let snapshot = state.tracker.snapshot().await;
    let (state_name, error) = match &snapshot.state {
        AnalysisState::Idle => ("idle", None),
        AnalysisState::Requesting => ("requesting", None),
        AnalysisState::Succeeded => ("succeeded", None),
        AnalysisState::Failed(message) => ("failed", Some(message.clone())),
    };

    let mut view = AnalysisView {
        state: state_name.to_string(),
        error,
        busy: snapshot.busy,
        updated_at: snapshot.updated_at,
        detected_groups: Vec::new(),
        recipes: Vec::new(),
        food_saving_tips: Vec::new(),
        safety_notes: Vec::new(),
    };

    let Some(result) = snapshot.result else {
        return view;
    };

    view.detected_groups = group_by_category(&result.detected_items)
        .into_iter()
        .map(|(category, items)| CategoryGroup {
            category: category.as_str().to_string(),
            items,
        })
        .collect();

    for recipe in filter.apply(&result.recipes) {
        view.recipes.push(RecipeView {
            saved: state.saved.is_saved(recipe).await,
            recipe: recipe.clone(),
        });
    }
    view.food_saving_tips = result.food_saving_tips;
    view.safety_notes = result.safety_notes;
    view
}
