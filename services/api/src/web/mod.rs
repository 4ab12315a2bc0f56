pub mod analysis;
pub mod auth;
pub mod middleware;
pub mod navigation;
pub mod rest;
pub mod saved;
pub mod settings;
pub mod state;
pub mod substitution;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub use middleware::require_session;
use state::AppState;

/// Photos arrive base64-encoded inside JSON, so allow generous bodies.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Builds the API router. Everything outside `/auth` requires a session.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Protected routes (session required)
    let protected_routes = Router::new()
        .route("/session", get(settings::session_handler))
        .route("/settings/language", put(settings::set_language_handler))
        .route("/settings/preferences", put(settings::set_preferences_handler))
        .route("/onboarding/complete", post(settings::complete_onboarding_handler))
        .route("/analysis/image", post(analysis::analyze_image_handler))
        .route("/analysis/text", post(analysis::analyze_text_handler))
        .route("/analysis/voice", post(analysis::analyze_voice_handler))
        .route(
            "/analysis",
            get(analysis::get_analysis_handler).delete(analysis::reset_analysis_handler),
        )
        .route("/recipes/saved", get(saved::list_saved_handler))
        .route("/recipes/saved/toggle", post(saved::toggle_saved_handler))
        .route("/substitutions", post(substitution::substitution_handler))
        .route("/navigation", get(navigation::get_view_handler))
        .route("/navigation/{action}", post(navigation::navigate_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_session,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state)
}
