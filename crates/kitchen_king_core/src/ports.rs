//! crates/kitchen_king_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;

use crate::domain::InferenceRequest;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// What an adapter reports when the outside world lets it down. Driver and
/// transport detail is flattened into the message; adapters log the original.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The external generative-inference service.
///
/// Implementations return the service's raw text untouched and must not retry.
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Runs a JSON-mode request constrained by `request.response_schema`.
    async fn generate_structured(&self, request: &InferenceRequest) -> PortResult<String>;

    /// Runs a plain-text prompt with no output schema.
    async fn generate_text(&self, prompt: &str) -> PortResult<String>;
}

/// A durable per-device key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been written or was removed.
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;

    async fn remove(&self, key: &str) -> PortResult<()>;
}
