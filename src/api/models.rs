use crate::storage::{ReviewStore, StoreError};
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReviewStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }
}

/// Body of `POST /review` and `PUT /review/{id}`.
///
/// Unknown fields (`id`, `dateCreated`) are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub title: String,
    pub director: String,
    pub release_date: String,
    pub rating: String,
    pub review_notes: String,
}

impl ReviewRequest {
    /// Validate the request
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("title", &self.title),
            ("director", &self.director),
            ("rating", &self.rating),
            ("reviewNotes", &self.review_notes),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{} cannot be empty", field));
            }
        }
        Ok(())
    }
}

/// Body of a successful delete: `{"deleted":"success"}`
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: &'static str,
}

impl DeleteResponse {
    pub fn success() -> Self {
        Self { deleted: "success" }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub total_reviews: i64,
}

/// Error envelope: `{"Error": "<message>"}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "Error")]
    pub error: String,
}

/// Application error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("request timed out after {0:?}")]
    RequestTimeout(Duration),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Every failure is reported as 400; clients tell failures apart by the
    /// message only.
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(format!("invalid id: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store(StoreError::Persistence { op, source }) => {
                error!(op, error = %source, "Database error");
            }
            ApiError::Store(StoreError::Timeout { op, limit }) => {
                error!(op, ?limit, "Database operation timed out");
            }
            ApiError::RequestTimeout(limit) => warn!(?limit, "Request timed out"),
            ApiError::Internal(message) => error!(%message, "Internal error"),
            other => warn!(error = %other, "Request failed"),
        }

        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
