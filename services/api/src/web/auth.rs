//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, and logout.
//!
//! There is one session per device: logging in replaces whoever was logged in
//! before, and the new user's saved recipes replace the old user's in memory.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use kitchen_king_core::{CoreError, User};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::rest::{reject, ErrorBody, HandlerError};
use crate::web::settings::{session_view, SessionResponse};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[schema(example = "asha")]
    pub username: String,
    #[schema(example = "1234")]
    pub pin: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create an account and log it in
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created and logged in", body = SessionResponse),
        (status = 401, description = "Username taken or malformed credentials", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let language = state.context.language().await;
    let user = state
        .context
        .register(&req.username, &req.pin)
        .await
        .map_err(|e| reject(e, language))?;
    let view = enter_session(&state, &user)
        .await
        .map_err(|e| reject(e, language))?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// POST /auth/login - Log in with an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let language = state.context.language().await;
    let user = state
        .context
        .login(&req.username, &req.pin)
        .await
        .map_err(|e| reject(e, language))?;
    let view = enter_session(&state, &user)
        .await
        .map_err(|e| reject(e, language))?;
    Ok((StatusCode::OK, Json(view)))
}

/// POST /auth/logout - End the session on this device
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Logout successful"),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let language = state.context.language().await;
    state
        .context
        .logout()
        .await
        .map_err(|e| reject(e, language))?;
    state.saved.discard().await;
    state.tracker.reset().await;
    state.navigator.lock().await.reset();
    Ok(StatusCode::NO_CONTENT)
}

/// Loads the user's cookbook and starts them on a clean home screen.
async fn enter_session(state: &AppState, user: &User) -> Result<SessionResponse, CoreError> {
    state.saved.load(&user.username).await?;
    state.tracker.reset().await;
    state.navigator.lock().await.reset();
    session_view(state).await
}
