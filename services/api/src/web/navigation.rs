//! services/api/src/web/navigation.rs
//!
//! Screen transitions. The current view lives on the server so every client of
//! this device agrees on it.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use kitchen_king_core::{HomeEffect, View};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;

use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct ViewResponse {
    #[schema(value_type = String, example = "analysis")]
    pub view: View,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavAction {
    Saved,
    Home,
    Back,
}

/// GET /navigation - The current view
#[utoipa::path(
    get,
    path = "/navigation",
    responses(
        (status = 200, description = "The current view", body = ViewResponse)
    )
)]
pub async fn get_view_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let view = state.navigator.lock().await.view();
    Json(ViewResponse { view })
}

/// POST /navigation/{action} - Move between screens
///
/// `home` discards the current analysis. `back` leaves the saved list for the
/// analysis if there is one, otherwise for home.
#[utoipa::path(
    post,
    path = "/navigation/{action}",
    params(
        ("action" = String, Path, description = "One of saved, home, back")
    ),
    responses(
        (status = 200, description = "The view after the transition", body = ViewResponse),
        (status = 400, description = "Unknown action")
    )
)]
pub async fn navigate_handler(
    State(state): State<Arc<AppState>>,
    Path(action): Path<NavAction>,
) -> impl IntoResponse {
    let has_analysis = state.tracker.latest().await.is_some();
    let mut navigator = state.navigator.lock().await;

    let view = match action {
        NavAction::Saved => navigator.open_saved(),
        NavAction::Back => navigator.back_from_saved(has_analysis),
        NavAction::Home => {
            if navigator.go_home(has_analysis) == HomeEffect::ResetAnalysis {
                state.tracker.reset().await;
            }
            navigator.view()
        }
    };
    debug!(?action, ?view, "Navigated.");
    Json(ViewResponse { view })
}
