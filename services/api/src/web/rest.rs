//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the error payload
//! every handler answers with.

use axum::{http::StatusCode, Json};
use kitchen_king_core::{CoreError, Language};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

use crate::web::{analysis, auth, navigation, saved, settings, substitution};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        settings::session_handler,
        settings::set_language_handler,
        settings::set_preferences_handler,
        settings::complete_onboarding_handler,
        analysis::analyze_image_handler,
        analysis::analyze_text_handler,
        analysis::analyze_voice_handler,
        analysis::get_analysis_handler,
        analysis::reset_analysis_handler,
        saved::list_saved_handler,
        saved::toggle_saved_handler,
        substitution::substitution_handler,
        navigation::get_view_handler,
        navigation::navigate_handler,
    ),
    components(
        schemas(
            ErrorBody,
            auth::CredentialsRequest,
            settings::SessionResponse,
            settings::LanguageRequest,
            settings::PreferencesRequest,
            analysis::ImageAnalysisRequest,
            analysis::TextAnalysisRequest,
            analysis::VoiceAnalysisRequest,
            analysis::AnalysisView,
            analysis::CategoryGroup,
            analysis::RecipeView,
            saved::ToggleResponse,
            substitution::SubstitutionRequest,
            substitution::SubstitutionResponse,
            navigation::ViewResponse,
        )
    ),
    tags(
        (name = "Kitchen King API", description = "Fridge analysis, recipe suggestions and the personal cookbook.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Payload
//=========================================================================================

/// The body of every non-2xx response. Only a short localized message is exposed.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

pub type HandlerError = (StatusCode, Json<ErrorBody>);

fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::InputValidation(_) => StatusCode::BAD_REQUEST,
        CoreError::Auth(_) => StatusCode::UNAUTHORIZED,
        CoreError::Busy => StatusCode::CONFLICT,
        CoreError::Inference(_) | CoreError::Parse(_) => StatusCode::BAD_GATEWAY,
        CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Logs the diagnostic detail of `err` and converts it into the response the
/// user sees.
pub fn reject(err: CoreError, language: Language) -> HandlerError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request refused: {}", err);
    }
    (
        status,
        Json(ErrorBody {
            message: err.user_message(language).to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitchen_king_core::AuthFailure;

    #[test]
    fn error_kinds_map_to_distinct_statuses() {
        assert_eq!(
            status_for(&CoreError::InputValidation("blank".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&CoreError::Auth(AuthFailure::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_for(&CoreError::Busy), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&CoreError::Parse("eof".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn rejection_carries_only_the_localized_message() {
        let (status, Json(body)) = reject(
            CoreError::Inference("tcp reset at 10.1.2.3".into()),
            Language::Hi,
        );
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.message.contains("10.1.2.3"));
        assert_eq!(
            body.message,
            CoreError::Inference(String::new()).user_message(Language::Hi)
        );
    }
}
