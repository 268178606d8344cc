use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::repository::StoreError;

/// ApiError
///
/// Every failure a request can end in. Handlers and services return this type and the
/// single `IntoResponse` impl below is the only place transport status codes are chosen.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, garbled or expired token, or a token whose user no longer exists.
    #[error("{0}")]
    Unauthenticated(String),
    /// Authenticated, but the role is not allowed to perform the operation.
    #[error("{0}")]
    Forbidden(String),
    /// Missing required field or malformed payload.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// Seed attempted against a collection that already holds documents.
    #[error("{message}")]
    Conflict { message: String, existing_count: u64 },
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn missing_field(field: &str) -> Self {
        Self::Validation(format!("Missing required field: {}", field))
    }

    pub fn exercise_not_found() -> Self {
        Self::NotFound("Exercise not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) | Self::Conflict { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// ErrorResponse
///
/// The failure form of the response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    /// Only present on seed conflicts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_count: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "request rejected");
        }

        let existing_count = match &self {
            Self::Conflict { existing_count, .. } => Some(*existing_count),
            _ => None,
        };
        let body = ErrorResponse {
            success: false,
            message: self.to_string(),
            existing_count,
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidId(raw) => {
                ApiError::Internal(format!("'{}' is not a valid document id", raw))
            }
            StoreError::Database(e) => {
                // The driver error stays in the logs; callers get a stable description.
                tracing::error!("document store error: {:?}", e);
                ApiError::Internal("Document store error".to_string())
            }
            StoreError::Corrupt(id) => {
                ApiError::Internal(format!("document {} is not a JSON object", id))
            }
        }
    }
}
