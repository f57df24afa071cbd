//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use maint_core::{PatchError, ValidationError};
use maint_storage::StorageError;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured details (e.g., the rejected value).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors with HTTP status code mapping.
///
/// Each variant maps to a specific HTTP status code and produces a structured
/// JSON error response body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The write would break a domain rule (400).
    #[error("validation failed: {0}")]
    ValidationFailed(ValidationError),

    /// The patch document was rejected (400).
    #[error("patch rejected: {0}")]
    PatchRejected(PatchError),

    /// Path and body IDs disagree on a full update (400).
    #[error("id mismatch: {0}")]
    IdMismatch(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::ValidationFailed(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            ApiError::PatchRejected(_) => (StatusCode::BAD_REQUEST, "PATCH_REJECTED"),
            ApiError::IdMismatch(_) => (StatusCode::BAD_REQUEST, "ID_MISMATCH"),
            ApiError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::ValidationFailed(ValidationError::ItemDataNotInVariants {
                path,
                item_data,
                allowed,
            }) => Some(serde_json::json!({
                "path": path,
                "itemData": item_data,
                "allowed": allowed,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::IdMismatch(msg)
            | ApiError::InternalError(msg) => msg.clone(),
            ApiError::ValidationFailed(err) => err.to_string(),
            ApiError::PatchRejected(err) => err.to_string(),
        };
        let detail = ApiErrorDetail {
            code: code.to_string(),
            message,
            details: self.details(),
        };

        let body = serde_json::json!({
            "success": false,
            "error": detail,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MaintenanceNotFound(_) | StorageError::SettingItemNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            StorageError::IdMismatch { .. } => ApiError::IdMismatch(err.to_string()),
            StorageError::Validation(inner) => ApiError::ValidationFailed(inner),
            StorageError::Patch(inner) => ApiError::PatchRejected(inner),
            StorageError::Database(_)
            | StorageError::Migration(_)
            | StorageError::Integrity { .. } => ApiError::InternalError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maint_core::{MaintenanceId, SettingId, SettingItemId};

    #[test]
    fn storage_errors_map_to_statuses() {
        let cases = [
            (
                StorageError::MaintenanceNotFound(MaintenanceId(1)),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                StorageError::SettingItemNotFound(SettingItemId(1)),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                StorageError::IdMismatch {
                    path: MaintenanceId(1),
                    body: MaintenanceId(2),
                },
                StatusCode::BAD_REQUEST,
                "ID_MISMATCH",
            ),
            (
                StorageError::Validation(ValidationError::UnknownParent(SettingId(9))),
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
            ),
            (
                StorageError::Patch(PatchError::UnknownField {
                    path: "/id".into(),
                }),
                StatusCode::BAD_REQUEST,
                "PATCH_REJECTED",
            ),
            (
                StorageError::Migration("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (storage, status, code) in cases {
            let api = ApiError::from(storage);
            assert_eq!(api.status_and_code(), (status, code), "{api}");
        }
    }

    #[test]
    fn validation_details_name_the_offending_item() {
        let api = ApiError::ValidationFailed(ValidationError::ItemDataNotInVariants {
            path: "item".into(),
            item_data: 99,
            allowed: vec![20, 25, 30],
        });
        let details = api.details().unwrap();
        assert_eq!(details["itemData"], 99);
        assert_eq!(details["allowed"], serde_json::json!([20, 25, 30]));
    }
}
