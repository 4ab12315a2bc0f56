//! crates/kitchen_king_core/src/pipeline.rs
//!
//! The recommendation pipeline (build request → call service → normalize) and
//! the lifecycle tracker the presentation layer observes.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{AnalysisResult, ImageInput, Preferences};
use crate::error::CoreError;
use crate::normalizer::normalize;
use crate::ports::InferenceService;
use crate::request::RequestBuilder;

//=========================================================================================
// Pipeline
//=========================================================================================

/// Runs one analysis from user input to a typed `AnalysisResult`.
#[derive(Clone)]
pub struct AnalysisPipeline {
    inference: Arc<dyn InferenceService>,
    builder: RequestBuilder,
}

impl AnalysisPipeline {
    pub fn new(inference: Arc<dyn InferenceService>) -> Self {
        Self {
            inference,
            builder: RequestBuilder::new(),
        }
    }

    pub async fn analyze_image(
        &self,
        image: ImageInput,
        preferences: Preferences,
    ) -> Result<AnalysisResult, CoreError> {
        let request = self.builder.build_image_request(image, preferences);
        self.run(request, "image").await
    }

    /// Blank text fails with `InputValidation` before the service is called.
    pub async fn analyze_text(
        &self,
        ingredients: &str,
        preferences: Preferences,
    ) -> Result<AnalysisResult, CoreError> {
        let request = self.builder.build_text_request(ingredients, preferences)?;
        self.run(request, "text").await
    }

    async fn run(
        &self,
        request: crate::domain::InferenceRequest,
        modality: &'static str,
    ) -> Result<AnalysisResult, CoreError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        info!(%request_id, modality, "Analysis request started.");

        let raw = self
            .inference
            .generate_structured(&request)
            .await
            .map_err(|e| {
                error!(%request_id, "Inference call failed: {}", e);
                CoreError::Inference(e.to_string())
            })?;

        let result = normalize(&raw)?;
        info!(
            %request_id,
            recipes = result.recipes.len(),
            elapsed = ?started.elapsed(),
            "Analysis request finished."
        );
        Ok(result)
    }
}

//=========================================================================================
// Lifecycle Tracker
//=========================================================================================

/// The analysis lifecycle as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Requesting,
    Succeeded,
    /// Carries the user-facing message of the failure.
    Failed(String),
}

/// A snapshot of the tracker for rendering.
#[derive(Debug, Clone)]
pub struct AnalysisSnapshot {
    pub state: AnalysisState,
    pub result: Option<AnalysisResult>,
    pub busy: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
struct TrackerInner {
    state: AnalysisState,
    result: Option<AnalysisResult>,
    busy: bool,
    in_flight: usize,
    updated_at: DateTime<Utc>,
}

/// Tracks `Idle → Requesting → {Succeeded | Failed}` and the latest good result.
///
/// The busy flag only guards the submit entry points. Unguarded starts (voice)
/// may overlap a running request; whichever finishes last wins.
#[derive(Debug)]
pub struct AnalysisTracker {
    inner: Mutex<TrackerInner>,
}

impl Default for AnalysisTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TrackerInner {
                state: AnalysisState::Idle,
                result: None,
                busy: false,
                in_flight: 0,
                updated_at: Utc::now(),
            }),
        }
    }

    /// Starts a request from a guarded entry point. Refused while busy.
    pub async fn begin_submit(&self) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().await;
        if inner.busy {
            return Err(CoreError::Busy);
        }
        inner.busy = true;
        Self::start(&mut inner);
        Ok(())
    }

    /// Starts a request from an unguarded entry point.
    pub async fn begin_unguarded(&self) {
        let mut inner = self.inner.lock().await;
        Self::start(&mut inner);
    }

    /// Records the outcome. A failure leaves the previous result in place.
    pub async fn finish(&self, outcome: &Result<AnalysisResult, String>) {
        let mut inner = self.inner.lock().await;
        inner.in_flight = inner.in_flight.saturating_sub(1);
        if inner.in_flight == 0 {
            inner.busy = false;
        }
        match outcome {
            Ok(result) => {
                inner.result = Some(result.clone());
                inner.state = AnalysisState::Succeeded;
            }
            Err(message) => {
                inner.state = AnalysisState::Failed(message.clone());
            }
        }
        inner.updated_at = Utc::now();
    }

    /// Back to `Idle`, forgetting the result.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = AnalysisState::Idle;
        inner.result = None;
        inner.updated_at = Utc::now();
    }

    pub async fn snapshot(&self) -> AnalysisSnapshot {
        let inner = self.inner.lock().await;
        AnalysisSnapshot {
            state: inner.state.clone(),
            result: inner.result.clone(),
            busy: inner.busy,
            updated_at: inner.updated_at,
        }
    }

    pub async fn latest(&self) -> Option<AnalysisResult> {
        self.inner.lock().await.result.clone()
    }

    fn start(inner: &mut TrackerInner) {
        inner.in_flight += 1;
        inner.state = AnalysisState::Requesting;
        inner.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_result(tip: &str) -> AnalysisResult {
        AnalysisResult {
            detected_items: vec![],
            recipes: vec![],
            food_saving_tips: vec![tip.to_string()],
            safety_notes: vec![],
        }
    }

    #[tokio::test]
    async fn starts_idle() {
        let tracker = AnalysisTracker::new();
        let snap = tracker.snapshot().await;
        assert_eq!(snap.state, AnalysisState::Idle);
        assert!(snap.result.is_none());
        assert!(!snap.busy);
    }

    #[tokio::test]
    async fn submit_is_refused_while_busy_but_voice_is_not() {
        let tracker = AnalysisTracker::new();
        tracker.begin_submit().await.unwrap();
        assert!(matches!(tracker.begin_submit().await, Err(CoreError::Busy)));

        tracker.begin_unguarded().await;
        assert_eq!(tracker.snapshot().await.state, AnalysisState::Requesting);
    }

    #[tokio::test]
    async fn failure_keeps_the_previous_result() {
        let tracker = AnalysisTracker::new();
        tracker.begin_submit().await.unwrap();
        tracker.finish(&Ok(empty_result("first"))).await;

        tracker.begin_submit().await.unwrap();
        tracker.finish(&Err("boom".to_string())).await;

        let snap = tracker.snapshot().await;
        assert_eq!(snap.state, AnalysisState::Failed("boom".to_string()));
        assert_eq!(snap.result.unwrap().food_saving_tips, vec!["first"]);
        assert!(!snap.busy);
    }

    #[tokio::test]
    async fn last_to_finish_wins_and_busy_clears_when_all_done() {
        let tracker = AnalysisTracker::new();
        tracker.begin_submit().await.unwrap();
        tracker.begin_unguarded().await;

        tracker.finish(&Ok(empty_result("voice"))).await;
        assert!(tracker.snapshot().await.busy);

        tracker.finish(&Ok(empty_result("photo"))).await;
        let snap = tracker.snapshot().await;
        assert!(!snap.busy);
        assert_eq!(snap.result.unwrap().food_saving_tips, vec!["photo"]);
    }

    #[tokio::test]
    async fn reset_returns_to_idle() {
        let tracker = AnalysisTracker::new();
        tracker.begin_submit().await.unwrap();
        tracker.finish(&Ok(empty_result("x"))).await;
        tracker.reset().await;
        let snap = tracker.snapshot().await;
        assert_eq!(snap.state, AnalysisState::Idle);
        assert!(tracker.latest().await.is_none());
    }
}
