//! API error type with automatic HTTP status mapping.
//!
//! Every failure serializes as `{"error": "<message>"}`: validation and
//! conflicts are 400, missing entities 404, storage failures 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use pantryctl_core::validate::ValidationError;

use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Resource not found (404)
    NotFound { message: &'static str },

    /// Duplicate barcode (400)
    Conflict { message: String },

    /// Storage failure (500, logged)
    Storage(StoreError),

    /// Invariant broken mid-request (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn item_not_found() -> Self {
        Self::NotFound {
            message: "Item not found",
        }
    }

    pub fn project_not_found() -> Self {
        Self::NotFound {
            message: "Project not found",
        }
    }

    pub fn barcode_not_found() -> Self {
        Self::NotFound {
            message: "Barcode not found for this item",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::NotFound { message } => (StatusCode::NOT_FOUND, message.to_owned()),
            Self::Conflict { message } => (StatusCode::BAD_REQUEST, message),
            Self::Storage(e) => {
                tracing::error!("storage error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            Self::Internal { message } => {
                tracing::error!("internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { resource, .. } => Self::NotFound {
                message: match resource {
                    "item" => "Item not found",
                    "project" => "Project not found",
                    _ => "Not found",
                },
            },
            StoreError::BarcodeInUse { item_name, .. } => Self::Conflict {
                message: format!("Barcode already exists for item: {item_name}"),
            },
            other => Self::Storage(other),
        }
    }
}
