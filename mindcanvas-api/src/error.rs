//! Error Types for the MindCanvas API
//!
//! All errors are serialized as JSON `{code, message}` with a status code
//! derived from the [`ErrorCode`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mindcanvas_core::{CanvasError, ConfigError, DomainError, EntityType, StorageError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No user identity on the request
    Unauthorized,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing or empty
    MissingField,

    MapNotFound,
    BlockNotFound,

    /// Reading or writing a user document failed
    StorageError,

    InternalError,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidInput | ErrorCode::MissingField => StatusCode::BAD_REQUEST,
            ErrorCode::MapNotFound | ErrorCode::BlockNotFound => StatusCode::NOT_FOUND,
            ErrorCode::StorageError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "Missing user_id",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::MapNotFound => "Map not found",
            ErrorCode::BlockNotFound => "Block not found",
            ErrorCode::StorageError => "Storage operation failed",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn map_not_found() -> Self {
        Self::from_code(ErrorCode::MapNotFound)
    }

    pub fn block_not_found() -> Self {
        Self::from_code(ErrorCode::BlockNotFound)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<CanvasError> for ApiError {
    fn from(err: CanvasError) -> Self {
        match err {
            CanvasError::Domain(DomainError::NotFound { entity_type, .. }) => match entity_type {
                EntityType::Map => ApiError::map_not_found(),
                EntityType::Block => ApiError::block_not_found(),
            },
            CanvasError::Config(ConfigError::InvalidValue { field, reason, .. }) => {
                ApiError::invalid_input(format!("Invalid {}: {}", field, reason))
            }
            CanvasError::Storage(e) => {
                // Paths and parser output stay in the logs.
                tracing::error!(error = %e, "Storage failure");
                match e {
                    StorageError::LockPoisoned => ApiError::internal_error("Storage lock poisoned"),
                    _ => ApiError::from_code(ErrorCode::StorageError),
                }
            }
            other => {
                tracing::error!(error = %other, "Unexpected error");
                ApiError::internal_error(ErrorCode::InternalError.default_message())
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        CanvasError::Config(err).into()
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
