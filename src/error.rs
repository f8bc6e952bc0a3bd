//! Error types and handling for the seniors query service

use crate::store::LoadError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;
use std::fmt;

/// Minimum number of characters a name search must carry after trimming
pub const MIN_NAME_QUERY_CHARS: usize = 2;

/// Application error types
#[derive(Debug, Serialize)]
pub enum AppError {
    InvalidInput(String),
    DatasetNotFound(String),
    LoadFailed(String),
    Upstream(String),
    Timeout(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::DatasetNotFound(key) => write!(f, "Dataset not found: {}", key),
            AppError::LoadFailed(msg) => write!(f, "Dataset load failed: {}", msg),
            AppError::Upstream(msg) => write!(f, "Upstream request failed: {}", msg),
            AppError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Stable machine-readable code, used in HTTP error bodies
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::DatasetNotFound(_) => "dataset_not_found",
            AppError::LoadFailed(_) => "load_failed",
            AppError::Upstream(_) => "upstream_failed",
            AppError::Timeout(_) => "timeout",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Process exit code for CLI mode
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidInput(_) => 1,
            AppError::Upstream(_) => 2,
            AppError::DatasetNotFound(_) => 3,
            AppError::Timeout(_) => 4,
            AppError::LoadFailed(_) | AppError::Internal(_) => 5,
        }
    }
}

impl From<&AppError> for StatusCode {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::DatasetNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        let body = Json(json!({
            "error": self.message(),
            "code": self.error_code(),
        }));
        (status, body).into_response()
    }
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::Missing(key) => AppError::DatasetNotFound(key),
            other => AppError::LoadFailed(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else {
            AppError::Upstream(err.to_string())
        }
    }
}

/// Validate a name search query, returning the trimmed form
pub fn validate_name_query(name: &str) -> Result<&str, AppError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_NAME_QUERY_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Name query must be at least {} characters",
            MIN_NAME_QUERY_CHARS
        )));
    }
    Ok(trimmed)
}
