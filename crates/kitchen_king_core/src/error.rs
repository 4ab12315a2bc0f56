//! crates/kitchen_king_core/src/error.rs
//!
//! The error taxonomy every core component reports through.

use crate::domain::Language;
use crate::ports::PortError;

/// Why a registration or login attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Username shorter than 3 characters or PIN not exactly 4 digits.
    MalformedCredentials,
    InvalidCredentials,
    UsernameTaken,
    NotLoggedIn,
}

/// The primary error type for the core crate.
///
/// The `String` payloads are diagnostic detail for logs only. Callers show
/// [`CoreError::user_message`] instead.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The input was rejected before any network call was made.
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// The inference service could not be reached or reported a failure.
    #[error("Inference service error: {0}")]
    Inference(String),

    /// The inference service answered with a payload that is not a valid result.
    #[error("Could not parse inference output: {0}")]
    Parse(String),

    #[error("Authentication failed: {0:?}")]
    Auth(AuthFailure),

    /// Reading or writing the key-value store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A guarded entry point was used while a request is already in flight.
    #[error("An analysis request is already in progress")]
    Busy,
}

impl From<PortError> for CoreError {
    fn from(err: PortError) -> Self {
        CoreError::Storage(err.to_string())
    }
}

impl CoreError {
    /// A short message safe to show to the user in their chosen language.
    pub fn user_message(&self, language: Language) -> &'static str {
        match (self, language) {
            (CoreError::InputValidation(_), Language::En) => {
                "Please type some ingredients or add a photo first."
            }
            (CoreError::InputValidation(_), Language::Hi) => {
                "कृपया पहले कुछ सामग्री लिखें या फोटो जोड़ें।"
            }
            (CoreError::Inference(_), Language::En) => {
                "We couldn't reach the kitchen assistant. Please try again."
            }
            (CoreError::Inference(_), Language::Hi) => {
                "किचन असिस्टेंट से संपर्क नहीं हो सका। कृपया फिर से कोशिश करें।"
            }
            (CoreError::Parse(_), Language::En) => {
                "Failed to analyze. Please try a clearer photo or different ingredients."
            }
            (CoreError::Parse(_), Language::Hi) => {
                "विश्लेषण नहीं हो सका। कृपया साफ़ फोटो या अलग सामग्री आज़माएँ।"
            }
            (CoreError::Auth(AuthFailure::MalformedCredentials), Language::En) => {
                "Username min 3 chars, PIN 4 digits."
            }
            (CoreError::Auth(AuthFailure::MalformedCredentials), Language::Hi) => {
                "यूज़रनेम कम से कम 3 अक्षर, पिन 4 अंक।"
            }
            (CoreError::Auth(AuthFailure::InvalidCredentials), Language::En) => {
                "Invalid username or PIN."
            }
            (CoreError::Auth(AuthFailure::InvalidCredentials), Language::Hi) => {
                "गलत यूज़रनेम या पिन।"
            }
            (CoreError::Auth(AuthFailure::UsernameTaken), Language::En) => {
                "That username is already taken."
            }
            (CoreError::Auth(AuthFailure::UsernameTaken), Language::Hi) => {
                "यह यूज़रनेम पहले से लिया जा चुका है।"
            }
            (CoreError::Auth(AuthFailure::NotLoggedIn), Language::En) => "Please log in first.",
            (CoreError::Auth(AuthFailure::NotLoggedIn), Language::Hi) => "कृपया पहले लॉग इन करें।",
            (CoreError::Storage(_), Language::En) => "Something went wrong. Please try again.",
            (CoreError::Storage(_), Language::Hi) => "कुछ गलत हो गया। कृपया फिर से कोशिश करें।",
            (CoreError::Busy, Language::En) => "Still cooking up your last request...",
            (CoreError::Busy, Language::Hi) => "आपका पिछला अनुरोध अभी चल रहा है...",
        }
    }
}
