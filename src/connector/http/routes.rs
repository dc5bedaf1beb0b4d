//! Relay routes: `POST /api/chat`, `GET /`, `GET /health`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::application::HealthAnalysisUseCase;
use crate::domain::RelayResponse;

use super::error::{panic_response, ApiError, MESSAGE_REQUIRED};

/// Shared, immutable relay state. Requests never mutate it.
pub struct RelayState {
    pub analysis: Arc<HealthAnalysisUseCase>,
}

/// Lenient body shape so a missing `message` is a 400, not a decoder error.
#[derive(Debug, Deserialize)]
struct ChatBody {
    #[serde(default)]
    message: Option<String>,
}

/// Build the complete relay router.
pub fn build(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

async fn index() -> &'static str {
    info!("Banner requested");
    "SwasthyaAI backend is running: use POST /api/chat"
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /api/chat`: one message in, one normalized reply out.
async fn chat(
    State(state): State<Arc<RelayState>>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<RelayResponse>, ApiError> {
    let message = match body {
        Ok(Json(body)) => body.message,
        Err(rejection) => {
            debug!("Rejected chat body: {rejection}");
            None
        }
    };

    let message = message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest(MESSAGE_REQUIRED.to_string()))?;

    let response = state.analysis.analyze(&message).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_response_has_ok_status() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert!(!body["version"].as_str().unwrap_or("").is_empty());
    }
}
