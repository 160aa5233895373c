//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        GoogleSearchAdapter, LlmContentAdapter, LlmKeywordAdapter, OpenAiCompletionAdapter,
        TextExtractorAdapter, TopicExtractionPipeline, TrOcrAdapter, YouTubeSearchAdapter,
    },
    config::Config,
    error::ApiError,
    web::{
        flashcards_handler, quiz_results_handler, rest::ApiDoc, start_quiz_handler,
        state::{AppState, SessionStore},
        submit_answer_handler, topic_details_handler, upload_document_handler,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use studyaid_core::ports::CompletionService;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    // A missing key degrades the dependent feature at call time; the server
    // still starts.
    if config.llm_api_key.is_none() {
        warn!("LLM_API_KEY is not set; LLM-backed features will report as unconfigured");
    }
    let completion: Arc<dyn CompletionService> = Arc::new(OpenAiCompletionAdapter::new(
        config.llm_api_key.as_deref(),
        &config.llm_api_base,
        config.llm_model.clone(),
    ));

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let ocr = Arc::new(TrOcrAdapter::new(config.ocr_model_dir.clone()));
    let extractor = Arc::new(TextExtractorAdapter::new(ocr));
    let topics = Arc::new(TopicExtractionPipeline::new(completion.clone()));
    let content = Arc::new(LlmContentAdapter::new(completion.clone()));
    let keywords = Arc::new(LlmKeywordAdapter::new(completion.clone()));
    let videos = Arc::new(YouTubeSearchAdapter::new(
        http.clone(),
        config.youtube_api_key.clone(),
    ));
    let articles = Arc::new(GoogleSearchAdapter::new(
        http,
        config.google_search_api_key.clone(),
        config.search_engine_id.clone(),
    ));

    // --- 3. Build the Shared AppState ---
    let app_state = AppState {
        sessions: SessionStore::new(config.session_ttl),
        config: config.clone(),
        extractor,
        topics,
        content,
        keywords,
        videos,
        articles,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/documents", post(upload_document_handler))
        .route("/topics/{topic}", get(topic_details_handler))
        .route("/topics/{topic}/flashcards", get(flashcards_handler))
        .route("/sessions/{session_id}/quiz", post(start_quiz_handler))
        .route(
            "/sessions/{session_id}/quiz/answer",
            post(submit_answer_handler),
        )
        .route(
            "/sessions/{session_id}/quiz/results",
            get(quiz_results_handler),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
