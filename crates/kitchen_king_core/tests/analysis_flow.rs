//! crates/kitchen_king_core/tests/analysis_flow.rs
//!
//! Drives the pipeline, tracker, saved store and context together through the
//! in-process fakes.

use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;

use kitchen_king_core::fakes::{FakeInferenceService, InMemoryStore};
use kitchen_king_core::{
    filter_recipes, AnalysisPipeline, AnalysisState, AnalysisTracker, AppContext, CoreError, Diet,
    ImageInput, Language, Navigator, Preferences, PortError, SavedRecipeStore, View,
};

fn recipe_json(id: &str, name: &str, quick: bool, no_gas: bool) -> serde_json::Value {
    json!({
        "id": id,
        "nameEn": name,
        "nameHi": format!("{} (hi)", name),
        "time": "15 mins",
        "difficulty": "Easy",
        "whyFit": "Uses the spinach",
        "ingredientsEn": ["spinach"],
        "ingredientsHi": ["पालक"],
        "stepsEn": ["Cook"],
        "stepsHi": ["पकाएँ"],
        "calories": "200 kcal",
        "servingSize": "2 people",
        "isQuick": quick,
        "isNoGas": no_gas
    })
}

fn three_recipe_payload() -> String {
    json!({
        "detectedItems": [
            {"name": "Spinach", "category": "Vegetables", "freshness": "Fresh"},
            {"name": "Milk", "category": "Dairy", "freshness": "Use soon"}
        ],
        "recipes": [
            recipe_json("r1", "Palak Paneer", false, false),
            recipe_json("r2", "Spinach Toast", true, false),
            recipe_json("r3", "Palak Dal", false, false)
        ],
        "foodSavingTips": ["Blanch and freeze spinach"],
        "safetyNotes": []
    })
    .to_string()
}

fn fridge_photo() -> ImageInput {
    ImageInput {
        mime_type: "image/jpeg".to_string(),
        data: Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xE0]),
    }
}

#[tokio::test]
async fn image_analysis_end_to_end_with_filters() {
    let fake = Arc::new(FakeInferenceService::new().with_default_structured(&three_recipe_payload()));
    let pipeline = AnalysisPipeline::new(fake.clone());
    let preferences = Preferences {
        diet: Diet::Veg,
        time_available: 20,
        servings: 2,
    };

    let result = pipeline.analyze_image(fridge_photo(), preferences).await.unwrap();

    let request = fake.last_request().unwrap();
    assert!(request.instruction.contains("Veg"));
    assert!(request.instruction.contains("20"));
    assert!(request.instruction.contains("2"));
    assert_eq!(request.image.unwrap().mime_type, "image/jpeg");

    let quick = filter_recipes(&result.recipes, true, false);
    assert_eq!(quick.len(), 1);
    assert_eq!(quick[0].id, "r2");

    assert!(filter_recipes(&result.recipes, false, true).is_empty());

    let all: Vec<String> = filter_recipes(&result.recipes, false, false)
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(all, vec!["r1", "r2", "r3"]);
}

#[tokio::test]
async fn blank_text_never_reaches_the_service() {
    let fake = Arc::new(FakeInferenceService::new().with_default_structured(&three_recipe_payload()));
    let pipeline = AnalysisPipeline::new(fake.clone());

    let err = pipeline
        .analyze_text("  \n\t ", Preferences::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InputValidation(_)));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn failed_run_keeps_the_previous_result_visible() {
    let fake = Arc::new(FakeInferenceService::new());
    fake.push_structured(Ok(three_recipe_payload()));
    fake.push_structured(Ok("this is not json".to_string()));
    fake.push_structured(Err(PortError::Unexpected("503 Service Unavailable".to_string())));
    let pipeline = AnalysisPipeline::new(fake);
    let tracker = AnalysisTracker::new();

    tracker.begin_submit().await.unwrap();
    let first = pipeline
        .analyze_text("spinach, milk", Preferences::default())
        .await
        .map_err(|e| e.user_message(Language::En).to_string());
    tracker.finish(&first).await;

    tracker.begin_submit().await.unwrap();
    let second = pipeline
        .analyze_text("spinach", Preferences::default())
        .await;
    assert!(matches!(second, Err(CoreError::Parse(_))));
    tracker
        .finish(&second.map_err(|e| e.user_message(Language::En).to_string()))
        .await;

    tracker.begin_unguarded().await;
    let third = pipeline.analyze_text("spinach", Preferences::default()).await;
    assert!(matches!(third, Err(CoreError::Inference(_))));
    tracker
        .finish(&third.map_err(|e| e.user_message(Language::En).to_string()))
        .await;

    let snap = tracker.snapshot().await;
    assert!(matches!(snap.state, AnalysisState::Failed(_)));
    assert_eq!(snap.result.unwrap().recipes.len(), 3);
}

#[tokio::test]
async fn switching_users_shows_only_their_saved_recipes() {
    let fake = Arc::new(FakeInferenceService::new().with_default_structured(&three_recipe_payload()));
    let pipeline = AnalysisPipeline::new(fake);
    let store = Arc::new(InMemoryStore::new());
    let context = AppContext::start(store.clone()).await.unwrap();
    let saved = SavedRecipeStore::new(store.clone());

    let alice = context.register("alice", "1111").await.unwrap();
    saved.load(&alice.username).await.unwrap();
    let result = pipeline
        .analyze_text("spinach", Preferences::default())
        .await
        .unwrap();
    saved.toggle(&alice.username, &result.recipes[0]).await.unwrap();
    saved.toggle(&alice.username, &result.recipes[1]).await.unwrap();
    assert_eq!(saved.current().await.len(), 2);

    context.logout().await.unwrap();
    saved.discard().await;
    let bob = context.register("bob", "2222").await.unwrap();
    let bob_set = saved.load(&bob.username).await.unwrap();
    assert!(bob_set.is_empty());
    assert!(!saved.is_saved(&result.recipes[0]).await);
}

#[tokio::test]
async fn context_survives_a_restart_over_the_same_store() {
    let store = Arc::new(InMemoryStore::new());
    {
        let context = AppContext::start(store.clone()).await.unwrap();
        context.register("alice", "1234").await.unwrap();
        context.set_language(Language::Hi).await.unwrap();
    }

    let restarted = AppContext::start(store).await.unwrap();
    assert_eq!(restarted.current_user().await.unwrap().username, "alice");
    assert_eq!(restarted.language().await, Language::Hi);
}

#[tokio::test]
async fn navigation_back_from_saved_follows_the_tracker() {
    let tracker = AnalysisTracker::new();
    let mut navigator = Navigator::new();

    navigator.open_saved();
    let has_result = tracker.latest().await.is_some();
    assert_eq!(navigator.back_from_saved(has_result), View::Home);

    tracker.begin_submit().await.unwrap();
    let fake = FakeInferenceService::new().with_default_structured(&three_recipe_payload());
    let pipeline = AnalysisPipeline::new(Arc::new(fake));
    let outcome = pipeline
        .analyze_text("spinach", Preferences::default())
        .await
        .map_err(|e| e.to_string());
    tracker.finish(&outcome).await;
    navigator.show_analysis();

    navigator.open_saved();
    let has_result = tracker.latest().await.is_some();
    assert_eq!(navigator.back_from_saved(has_result), View::Analysis);
}
