//! crates/kitchen_king_core/src/fakes.rs
//!
//! In-process implementations of the ports.
//!
//! These let tests (and the `fake` / `memory` service modes) run without network
//! access, API costs, or a database.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use crate::domain::InferenceRequest;
use crate::ports::{InferenceService, KeyValueStore, PortError, PortResult};

//=========================================================================================
// Fake Inference Service
//=========================================================================================

/// A scripted inference service.
///
/// Structured and text calls each pop the next queued reply; when the queue is
/// empty the default reply is used, or an error if there is none.
#[derive(Debug, Default)]
pub struct FakeInferenceService {
    structured: Mutex<VecDeque<PortResult<String>>>,
    text: Mutex<VecDeque<PortResult<String>>>,
    default_structured: Option<String>,
    default_text: Option<String>,
    calls: AtomicUsize,
    last_request: Mutex<Option<InferenceRequest>>,
}

impl FakeInferenceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every structured call with `payload` unless something is queued.
    pub fn with_default_structured(mut self, payload: &str) -> Self {
        self.default_structured = Some(payload.to_string());
        self
    }

    /// Answers every text call with `reply` unless something is queued.
    pub fn with_default_text(mut self, reply: &str) -> Self {
        self.default_text = Some(reply.to_string());
        self
    }

    pub fn push_structured(&self, reply: PortResult<String>) {
        self.structured
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(reply);
    }

    pub fn push_text(&self, reply: PortResult<String>) {
        self.text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(reply);
    }

    /// How many calls of either kind reached the service.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<InferenceRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn next(
        queue: &Mutex<VecDeque<PortResult<String>>>,
        default: &Option<String>,
    ) -> PortResult<String> {
        let queued = queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        match (queued, default) {
            (Some(reply), _) => reply,
            (None, Some(reply)) => Ok(reply.clone()),
            (None, None) => Err(PortError::Unexpected(
                "FakeInferenceService: no reply configured".to_string(),
            )),
        }
    }
}

#[async_trait]
impl InferenceService for FakeInferenceService {
    async fn generate_structured(&self, request: &InferenceRequest) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());
        Self::next(&self.structured, &self.default_structured)
    }

    async fn generate_text(&self, _prompt: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.text, &self.default_text)
    }
}

//=========================================================================================
// In-Memory Key-Value Store
//=========================================================================================

/// A `KeyValueStore` backed by a `HashMap`. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every key currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| PortError::Unexpected("store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| PortError::Unexpected("store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| PortError::Unexpected("store lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_replies_come_before_the_default() {
        let fake = FakeInferenceService::new().with_default_text("default");
        fake.push_text(Ok("first".to_string()));
        assert_eq!(fake.generate_text("x").await.unwrap(), "first");
        assert_eq!(fake.generate_text("x").await.unwrap(), "default");
        assert_eq!(fake.call_count(), 2);
    }

    #[tokio::test]
    async fn no_reply_configured_is_an_error() {
        let fake = FakeInferenceService::new();
        assert!(fake.generate_text("x").await.is_err());
    }

    #[tokio::test]
    async fn store_get_set_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
