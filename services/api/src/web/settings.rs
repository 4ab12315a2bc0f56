//! services/api/src/web/settings.rs
//!
//! Session inspection, language and preference settings, and the onboarding flag.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use kitchen_king_core::{CoreError, Diet, Language, Preferences};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::web::rest::{reject, ErrorBody, HandlerError};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub username: String,
    #[schema(value_type = String, example = "en")]
    pub language: Language,
    #[schema(value_type = Object)]
    pub preferences: Preferences,
    pub needs_onboarding: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct LanguageRequest {
    #[schema(value_type = String, example = "hi")]
    pub language: Language,
}

/// The wire form of `Preferences`, shared by the settings and analysis routes.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRequest {
    #[schema(value_type = String, example = "Veg")]
    pub diet: Diet,
    #[schema(example = 30)]
    pub time_available: u32,
    #[schema(example = 2)]
    pub servings: u32,
}

impl From<PreferencesRequest> for Preferences {
    fn from(req: PreferencesRequest) -> Self {
        Preferences {
            diet: req.diet,
            time_available: req.time_available,
            servings: req.servings,
        }
    }
}

/// Describes the logged-in session. Fails with `NotLoggedIn` if there is none.
pub async fn session_view(state: &AppState) -> Result<SessionResponse, CoreError> {
    let user = state.context.require_user().await?;
    Ok(SessionResponse {
        username: user.username,
        language: state.context.language().await,
        preferences: state.context.preferences().await,
        needs_onboarding: state.context.needs_onboarding().await?,
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /session - Describe the current session
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "The active session", body = SessionResponse),
        (status = 401, description = "Not logged in", body = ErrorBody)
    )
)]
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let language = state.context.language().await;
    let view = session_view(&state)
        .await
        .map_err(|e| reject(e, language))?;
    Ok(Json(view))
}

/// PUT /settings/language - Switch the interface language
#[utoipa::path(
    put,
    path = "/settings/language",
    request_body = LanguageRequest,
    responses(
        (status = 204, description = "Language saved"),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn set_language_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LanguageRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    state
        .context
        .set_language(req.language)
        .await
        .map_err(|e| reject(e, req.language))?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /settings/preferences - Set the preferences new analyses run with
#[utoipa::path(
    put,
    path = "/settings/preferences",
    request_body = PreferencesRequest,
    responses(
        (status = 204, description = "Preferences saved")
    )
)]
pub async fn set_preferences_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreferencesRequest>,
) -> impl IntoResponse {
    let preferences = Preferences::from(req);
    info!(
        diet = %preferences.diet,
        time = preferences.time_available,
        servings = preferences.servings,
        "Preferences updated."
    );
    state.context.set_preferences(preferences).await;
    StatusCode::NO_CONTENT
}

/// POST /onboarding/complete - Mark the tutorial as seen for the current user
#[utoipa::path(
    post,
    path = "/onboarding/complete",
    responses(
        (status = 204, description = "Onboarding recorded"),
        (status = 401, description = "Not logged in", body = ErrorBody)
    )
)]
pub async fn complete_onboarding_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let language = state.context.language().await;
    state
        .context
        .complete_onboarding()
        .await
        .map_err(|e| reject(e, language))?;
    Ok(StatusCode::NO_CONTENT)
}
