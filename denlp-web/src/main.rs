//! Axum server exposing the German annotation pipeline over HTTP.

use std::sync::{Arc, RwLock};

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use denlp_core::{Pipeline, PipelineConfigPatch, ProcessingOptions};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state. Reconfiguration swaps the processors, so the
/// pipeline sits behind an `RwLock`: analyze calls take read locks, config
/// updates take the write lock.
struct AppState {
    pipeline: RwLock<Pipeline>,
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
    #[serde(default)]
    options: Option<ProcessingOptions>,
}

/// Canned sentences for the demo page.
const DEMO_TEXTS: &[&str] = &[
    "Herr Müller wohnt in Hamburg.",
    "Die Siemens AG eröffnet ein Büro in Freiburg.",
    "Der Mann lacht. Er lacht auch.",
    "die Katze sitzt auf dem Tisch.",
    "Frau Schmidt besucht die Hauptstraße.",
];

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let pipeline = Pipeline::new().expect("default rule tables must compile");
    let state = Arc::new(AppState {
        pipeline: RwLock::new(pipeline),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler))
        .route("/config", get(config_handler).post(set_config_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("annotation server listening on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}

/// Returns the main HTML page.
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Runs the pipeline over the posted text.
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "empty text"})),
        )
            .into_response();
    }

    let pipeline = state.pipeline.read().unwrap();
    match pipeline.process(&req.text, req.options.as_ref()) {
        Ok(result) => Json(result).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}

/// Returns the current pipeline configuration.
async fn config_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pipeline = state.pipeline.read().unwrap();
    Json(pipeline.config())
}

/// Merges a configuration patch and returns the updated configuration.
async fn set_config_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<PipelineConfigPatch>,
) -> impl IntoResponse {
    let mut pipeline = state.pipeline.write().unwrap();
    match pipeline.set_config(patch) {
        Ok(()) => Json(pipeline.config()).into_response(),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}

/// Returns the demo sentences.
async fn demo_texts_handler() -> impl IntoResponse {
    Json(DEMO_TEXTS)
}
