//! REST API server for workflow conversion.
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run --bin convert_server --features server
//!
//! curl -X POST http://localhost:8080/api/convert \
//!   -H "Content-Type: application/json" \
//!   -d '{"alteryx_xml": "<AlteryxWorkflow>...</AlteryxWorkflow>"}'
//!
//! curl http://localhost:8080/api/health
//! ```

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use alteryx2sql::{ConversionResult, GeminiClient, LlmClient, WorkflowConverter};

#[derive(Clone)]
struct AppState {
    converter: Arc<WorkflowConverter>,
}

#[derive(Deserialize)]
struct ConvertRequest {
    alteryx_xml: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("alteryx2sql=info,tower_http=debug")
            }),
        )
        .init();
    dotenvy::dotenv().ok();

    let client: Arc<dyn LlmClient> = Arc::new(GeminiClient::from_env()?);
    let state = AppState {
        converter: Arc::new(WorkflowConverter::new(client)),
    };

    let app = Router::new()
        .route("/api/convert", post(convert))
        .route("/api/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .unwrap_or(8080);
    let addr = format!("0.0.0.0:{port}");
    info!("starting conversion server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn convert(
    State(state): State<AppState>,
    Json(request): Json<ConvertRequest>,
) -> Result<Json<ConversionResult>, (StatusCode, Json<ErrorResponse>)> {
    if request.alteryx_xml.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "alteryx_xml must not be empty".to_string(),
            }),
        ));
    }

    Ok(Json(state.converter.convert(&request.alteryx_xml).await))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "alteryx2sql",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
