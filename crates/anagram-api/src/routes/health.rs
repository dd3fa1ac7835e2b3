use crate::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub storage: String,
}

/// `GET /health`: 503 when the word store does not answer a ping.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, storage) = match state.dictionary.index().ping().await {
        Ok(()) => (StatusCode::OK, "healthy", "ok".to_string()),
        Err(err) => {
            warn!(error = %err, "Health check storage ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", err.to_string())
        }
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.elapsed().as_secs(),
        storage,
    };
    (code, Json(response))
}
