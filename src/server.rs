use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use crate::inference::ModelHandle;
use crate::pipeline::Pipeline;
use crate::types::{IssueRecord, Result};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";
pub const NO_URGENT_ISSUES: &str = "No urgent issues found";

/// Shared state behind the HTTP handlers.
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub feeds: Vec<String>,
    pub models: Arc<ModelHandle>,
}

/// Envelope for the digest endpoint. Either a data payload or a message,
/// never both, with a status marker in each shape.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DigestResponse {
    Issues {
        data: Vec<IssueRecord>,
        status: &'static str,
    },
    Notice {
        message: String,
        status: &'static str,
    },
}

impl DigestResponse {
    fn issues(data: Vec<IssueRecord>) -> Self {
        Self::Issues {
            data,
            status: STATUS_SUCCESS,
        }
    }

    fn notice(message: impl Into<String>) -> Self {
        Self::Notice {
            message: message.into(),
            status: STATUS_SUCCESS,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::Notice {
            message: message.into(),
            status: STATUS_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub timestamp: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(urgent_issues))
        .route("/health", get(health))
        .with_state(state)
}

/// GET / runs a full digest pass and reports the urgent issues found.
async fn urgent_issues(State(state): State<Arc<AppState>>) -> (StatusCode, Json<DigestResponse>) {
    let pipeline = state.pipeline.clone();
    let feeds = state.feeds.clone();

    // The run gets its own task so a panic comes back as a JoinError
    // instead of tearing down the connection handler.
    let run = tokio::spawn(async move { pipeline.run(&feeds).await });

    match run.await {
        Ok(records) if records.is_empty() => {
            (StatusCode::OK, Json(DigestResponse::notice(NO_URGENT_ISSUES)))
        }
        Ok(records) => (StatusCode::OK, Json(DigestResponse::issues(records))),
        Err(e) => {
            error!("Digest request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DigestResponse::error(format!(
                    "Error processing request: {}",
                    e
                ))),
            )
        }
    }
}

/// GET /health reports liveness plus whether the inference backend came up.
/// Degraded mode still answers "healthy"; only `model_loaded` flips.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: state.models.is_loaded(),
        timestamp: Utc::now().to_string(),
    })
}

pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
