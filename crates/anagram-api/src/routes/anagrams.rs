//! Similarity lookup and word insertion

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::validation::validate_word;
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub word: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarResponse {
    pub similar: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddWordRequest {
    pub word: Option<String>,
}

/// `GET /api/v1/similar?word=..`
///
/// Records one timing sample per successful lookup.
#[instrument(skip_all)]
pub async fn similar(
    State(state): State<AppState>,
    query: Result<Query<SimilarQuery>, QueryRejection>,
) -> ApiResult<Json<SimilarResponse>> {
    let started = Instant::now();
    let observed_at = Utc::now();

    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    let word = validate_word(query.word.as_deref())?;

    let similar = state.dictionary.similar_words(word).await?;
    let duration_micros = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    state.dictionary.record_lookup(duration_micros, observed_at).await?;

    debug!(word, matches = similar.len(), duration_micros, "Similarity lookup served");
    Ok(Json(SimilarResponse { similar }))
}

/// `POST /api/v1/add-word` with `{"word": ..}`
#[instrument(skip_all)]
pub async fn add_word(
    State(state): State<AppState>,
    payload: Result<Json<AddWordRequest>, JsonRejection>,
) -> ApiResult<String> {
    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let word = validate_word(request.word.as_deref())?;

    state.dictionary.add_word(word).await?;
    Ok(format!("{word} added to the dictionary successfully!"))
}
