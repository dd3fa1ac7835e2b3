use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::validation::validate_range;
use anagram_types::StatsSummary;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// `GET /api/v1/stats[?from=..&to=..]`
pub async fn stats(
    State(state): State<AppState>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> ApiResult<Json<StatsSummary>> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    let window = validate_range(query.from.as_deref(), query.to.as_deref())?;
    Ok(Json(state.dictionary.statistics(window).await?))
}
