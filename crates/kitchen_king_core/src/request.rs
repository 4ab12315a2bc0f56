//! crates/kitchen_king_core/src/request.rs
//!
//! Composes inference requests from a photo or a typed ingredient list plus the
//! user's preferences. Nothing in here touches the network.

use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::warn;

use crate::domain::{ImageInput, InferenceRequest, Preferences};
use crate::error::CoreError;

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

const IMAGE_CONTEXT: &str = "an image of a refrigerator's contents";

const INSTRUCTION_TEMPLATE: &str = r#"Act as Kitchen King AI. Suggest recipes based on the following context: {context}

User Preferences:
- Diet: {diet}
- Time Available: {time} minutes
- Servings: {servings} people

Strict Requirements:
1. If context is text ingredients, acknowledge them in detectedItems.
2. Generate 3 high-quality recipes using the context items + basic pantry items.
3. Provide output in both English and Hindi.
4. Support the user's diet preference ({diet}).
5. Include Indian recipes first, then Continental/Quick snacks.
6. Provide 15-minute "Quick Mode" recipes if possible.
7. Suggest "No-gas/No-oven" options if ingredients allow.
8. Include health & safety warnings if applicable.
9. Include Food Waste Saver tips."#;

//=========================================================================================
// Request Builder
//=========================================================================================

/// Builds the single request sent for one analysis run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestBuilder;

impl RequestBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Request for a photo of the fridge. The image must already be decoded.
    pub fn build_image_request(&self, image: ImageInput, preferences: Preferences) -> InferenceRequest {
        InferenceRequest {
            instruction: build_instruction(IMAGE_CONTEXT, sanitize_preferences(preferences)),
            image: Some(image),
            response_schema: response_schema(),
        }
    }

    /// Request for a typed (or dictated) ingredient list.
    ///
    /// Rejects empty and all-whitespace input before anything else happens.
    pub fn build_text_request(
        &self,
        ingredients: &str,
        preferences: Preferences,
    ) -> Result<InferenceRequest, CoreError> {
        if ingredients.trim().is_empty() {
            return Err(CoreError::InputValidation(
                "ingredient text is empty".to_string(),
            ));
        }

        let context = format!("the user manually typed these ingredients: {}", ingredients);
        Ok(InferenceRequest {
            instruction: build_instruction(&context, sanitize_preferences(preferences)),
            image: None,
            response_schema: response_schema(),
        })
    }
}

/// Coerces servings to at least one. Out-of-range times are logged and kept.
fn sanitize_preferences(mut preferences: Preferences) -> Preferences {
    if preferences.servings == 0 {
        preferences.servings = 1;
    }
    if !(Preferences::MIN_TIME..=Preferences::MAX_TIME).contains(&preferences.time_available) {
        warn!(
            time_available = preferences.time_available,
            "Time available is outside the usual range; passing it through."
        );
    }
    preferences
}

fn build_instruction(context: &str, preferences: Preferences) -> String {
    INSTRUCTION_TEMPLATE
        .replace("{context}", context)
        .replace("{diet}", &preferences.diet.to_string())
        .replace("{time}", &preferences.time_available.to_string())
        .replace("{servings}", &preferences.servings.to_string())
}

//=========================================================================================
// Output Schema
//=========================================================================================

/// The JSON schema the inference service must answer with. Same for both modalities.
pub fn response_schema() -> Value {
    let string_array = json!({ "type": "array", "items": { "type": "string" } });

    json!({
        "type": "object",
        "properties": {
            "detectedItems": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "category": {
                            "type": "string",
                            "enum": ["Vegetables", "Dairy", "Fruits", "Proteins", "Others"]
                        },
                        "freshness": { "type": "string" }
                    },
                    "required": ["name", "category", "freshness"]
                }
            },
            "recipes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "nameEn": { "type": "string" },
                        "nameHi": { "type": "string" },
                        "time": { "type": "string" },
                        "difficulty": { "type": "string", "enum": ["Easy", "Medium"] },
                        "whyFit": { "type": "string" },
                        "ingredientsEn": string_array,
                        "ingredientsHi": string_array,
                        "stepsEn": string_array,
                        "stepsHi": string_array,
                        "calories": { "type": "string" },
                        "servingSize": { "type": "string" },
                        "isQuick": { "type": "boolean" },
                        "isNoGas": { "type": "boolean" }
                    },
                    "required": [
                        "id", "nameEn", "nameHi", "time", "difficulty", "whyFit",
                        "ingredientsEn", "ingredientsHi", "stepsEn", "stepsHi",
                        "calories", "servingSize"
                    ]
                }
            },
            "foodSavingTips": string_array,
            "safetyNotes": string_array
        },
        "required": ["detectedItems", "recipes", "foodSavingTips", "safetyNotes"]
    })
}

//=========================================================================================
// Image Decoding
//=========================================================================================

fn data_uri_regex() -> &'static Regex {
    static DATA_URI: OnceLock<Regex> = OnceLock::new();
    DATA_URI.get_or_init(|| {
        Regex::new(r"^data:([A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+)?(?:;[^,]*)?;base64,")
            .expect("data URI pattern is valid")
    })
}

/// Strips a `data:<mime>;base64,` header if present and decodes the payload.
///
/// Bare base64 is accepted and assumed to be JPEG.
pub fn decode_image(encoded: &str) -> Result<ImageInput, CoreError> {
    let encoded = encoded.trim();
    let (mime_type, payload) = match data_uri_regex().captures(encoded) {
        Some(caps) => {
            let header_len = caps.get(0).map(|m| m.end()).unwrap_or(0);
            let mime = caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
            (mime, &encoded[header_len..])
        }
        None => (DEFAULT_IMAGE_MIME.to_string(), encoded),
    };

    if payload.is_empty() {
        return Err(CoreError::InputValidation("image payload is empty".to_string()));
    }

    let data = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| CoreError::InputValidation(format!("image is not valid base64: {}", e)))?;

    Ok(ImageInput {
        mime_type,
        data: Bytes::from(data),
    })
}
