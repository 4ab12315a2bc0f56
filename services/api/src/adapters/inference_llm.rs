//! services/api/src/adapters/inference_llm.rs
//!
//! This module contains the adapter for the recipe-analysis LLM. It implements the
//! `InferenceService` port from the `core` crate against any OpenAI-compatible
//! chat-completions endpoint (Gemini's by default).

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ImageDetail, ImageUrl,
        ReasoningEffort, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use kitchen_king_core::{
    domain::{ImageInput, InferenceRequest},
    ports::{InferenceService, PortError, PortResult},
};
use std::time::Duration;
use tracing::{debug, error};

const SCHEMA_NAME: &str = "kitchen_analysis";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `InferenceService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct GeminiInferenceAdapter {
    client: Client<OpenAIConfig>,
    analysis_model: String,
    substitution_model: String,
}

impl GeminiInferenceAdapter {
    /// Creates a new `GeminiInferenceAdapter`.
    pub fn new(client: Client<OpenAIConfig>, analysis_model: String, substitution_model: String) -> Self {
        Self {
            client,
            analysis_model,
            substitution_model,
        }
    }

    /// Builds a client for `api_base` that surfaces the first failure instead of
    /// retrying it.
    pub fn client_for(api_key: &str, api_base: &str) -> Client<OpenAIConfig> {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        Client::with_config(config).with_backoff(no_retry)
    }

    fn structured_request(&self, request: &InferenceRequest) -> PortResult<CreateChatCompletionRequest> {
        let mut parts: Vec<ChatCompletionRequestUserMessageContentPart> = Vec::new();
        if let Some(image) = &request.image {
            parts.push(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: to_data_url(image),
                        detail: Some(ImageDetail::Auto),
                    },
                }
                .into(),
            );
        }
        parts.push(
            ChatCompletionRequestMessageContentPartText {
                text: request.instruction.clone(),
            }
            .into(),
        );

        let message: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
            .content(parts)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into();

        CreateChatCompletionRequestArgs::default()
            .model(&self.analysis_model)
            .messages(vec![message])
            .n(1)
            .reasoning_effort(ReasoningEffort::None)
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: Some("Detected fridge items and recipe suggestions".to_string()),
                    name: SCHEMA_NAME.to_string(),
                    schema: Some(request.response_schema.clone()),
                    strict: None,
                },
            })
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    fn text_request(&self, prompt: &str) -> PortResult<CreateChatCompletionRequest> {
        let message: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into();

        CreateChatCompletionRequestArgs::default()
            .model(&self.substitution_model)
            .messages(vec![message])
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn send(&self, request: CreateChatCompletionRequest) -> PortResult<String> {
        let model = request.model.clone();
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| {
                error!(model = %model, "Inference request failed: {}", e);
                PortError::Unexpected(e.to_string())
            })?;
        first_content(response)
    }
}

/// Encodes the image as an inline `data:` URL.
fn to_data_url(image: &ImageInput) -> String {
    format!("data:{};base64,{}", image.mime_type, STANDARD.encode(&image.data))
}

/// Extracts the text content from the first choice in the response.
fn first_content(response: CreateChatCompletionResponse) -> PortResult<String> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(PortError::Unexpected(
            "Inference LLM returned no choices in its response.".to_string(),
        ));
    };
    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(PortError::Unexpected(
            "Inference LLM response contained no text content.".to_string(),
        )),
    }
}

//=========================================================================================
// `InferenceService` Trait Implementation
//=========================================================================================

#[async_trait]
impl InferenceService for GeminiInferenceAdapter {
    async fn generate_structured(&self, request: &InferenceRequest) -> PortResult<String> {
        let chat_request = self.structured_request(request)?;
        debug!(
            model = %self.analysis_model,
            with_image = request.image.is_some(),
            "Sending structured inference request."
        );
        self.send(chat_request).await
    }

    async fn generate_text(&self, prompt: &str) -> PortResult<String> {
        let chat_request = self.text_request(prompt)?;
        self.send(chat_request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn data_url_carries_mime_type_and_base64_payload() {
        let image = ImageInput {
            mime_type: "image/png".to_string(),
            data: Bytes::from_static(b"abc"),
        };
        assert_eq!(to_data_url(&image), "data:image/png;base64,YWJj");
    }
}
