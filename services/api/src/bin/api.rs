//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{db::DbAdapter, inference_llm::GeminiInferenceAdapter},
    config::{Config, ConfigError, InferenceProvider, StorageBackend},
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use axum::http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method};
use kitchen_king_core::{fakes::{FakeInferenceService, InMemoryStore}, InferenceService, KeyValueStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// What the `fake` provider answers with: one detected item, one quick recipe.
const FAKE_ANALYSIS: &str = r#"{
  "detectedItems": [{"name": "Spinach", "category": "Vegetables", "freshness": "Fresh"}],
  "recipes": [{
    "id": "demo-1", "nameEn": "Spinach Poha", "nameHi": "पालक पोहा", "time": "15 mins",
    "difficulty": "Easy", "whyFit": "Quick and uses the spinach",
    "ingredientsEn": ["spinach", "poha"], "ingredientsHi": ["पालक", "पोहा"],
    "stepsEn": ["Rinse poha", "Saute spinach", "Mix"], "stepsHi": ["पोहा धोएँ", "पालक भूनें", "मिलाएँ"],
    "calories": "250 kcal", "servingSize": "2 people", "isQuick": true, "isNoGas": false
  }],
  "foodSavingTips": ["Blanch extra spinach and freeze it."],
  "safetyNotes": []
}"#;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Set Up Storage ---
    let store: Arc<dyn KeyValueStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_ref()
                .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; nothing survives a restart.");
            Arc::new(InMemoryStore::new())
        }
    };

    // --- 3. Initialize the Inference Adapter ---
    let inference: Arc<dyn InferenceService> = match config.inference_provider {
        InferenceProvider::Gemini => {
            let api_key = config
                .gemini_api_key
                .as_ref()
                .ok_or_else(|| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;
            let client = GeminiInferenceAdapter::client_for(api_key, &config.inference_api_base);
            Arc::new(GeminiInferenceAdapter::new(
                client,
                config.analysis_model.clone(),
                config.substitution_model.clone(),
            ))
        }
        InferenceProvider::Fake => {
            warn!("Using the fake inference provider; every analysis returns the demo result.");
            Arc::new(
                FakeInferenceService::new()
                    .with_default_structured(FAKE_ANALYSIS)
                    .with_default_text("You can use curd instead."),
            )
        }
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::build(store, inference).await?);

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let app = router(app_state)
        .layer(cors)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
