//! HTTP error mapping for the anagram API
//!
//! Every failure is reported as `400 {"type": .., "error": ..}`. Existing
//! clients branch on `type`, so the status code carries no information.

use anagram_core::{CoreError, StoreError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or missing request input
    #[error("{message}")]
    Validation { message: String },

    /// The exact word is already in the dictionary
    #[error("{message}")]
    Conflict { message: String },

    /// The storage backend failed or timed out
    #[error("{message}")]
    Storage { message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Value of the `type` field in the JSON body
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "Validation",
            ApiError::Conflict { .. } => "Word exists",
            ApiError::Storage { .. } => "Storage",
            ApiError::Internal { .. } => "Internal",
        }
    }

    pub fn to_response(&self) -> ApiErrorResponse {
        ApiErrorResponse { error_type: self.error_type().to_string(), error: self.to_string() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

/// JSON error body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_unavailable() {
            warn!(error = %err, "Storage unavailable");
        } else {
            error!(error = %err, "Storage operation failed");
        }
        ApiError::Storage { message: err.to_string() }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::WordExists { .. } => ApiError::Conflict { message: err.to_string() },
            CoreError::Storage(store) => store.into(),
            CoreError::NotFound { .. } | CoreError::WordList { .. } => {
                error!(error = %err, "Unexpected dictionary error");
                ApiError::internal(err.to_string())
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_every_error_is_bad_request() {
        let errors = [
            ApiError::validation("bad"),
            ApiError::Conflict { message: "dup".into() },
            ApiError::Storage { message: "down".into() },
            ApiError::internal("oops"),
        ];
        for err in errors {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_word_exists_maps_to_conflict() {
        let err: ApiError = CoreError::word_exists("cat").into();
        assert_eq!(err.error_type(), "Word exists");
        assert_eq!(err.to_string(), "The word: cat is already in the dictionary.");
    }

    #[test]
    fn test_store_timeout_maps_to_storage() {
        let timeout = StoreError::Timeout { operation: "fetch_words", after: Duration::from_millis(5) };
        let err: ApiError = CoreError::Storage(timeout).into();
        assert_eq!(err.error_type(), "Storage");
    }

    #[test]
    fn test_response_body_shape() {
        let body =
            serde_json::to_value(ApiError::validation("Word is invalid").to_response()).unwrap();
        assert_eq!(body, serde_json::json!({"type": "Validation", "error": "Word is invalid"}));
    }
}
