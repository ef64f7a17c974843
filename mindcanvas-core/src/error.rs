//! Error types for MindCanvas operations

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entity type discriminator used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Map,
    Block,
}

/// Caller-visible domain errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{entity_type:?} not found: {id}")]
    NotFound { entity_type: EntityType, id: String },
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// LLM provider errors. Never surfaced past the generation service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Rate limited by {provider}, retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: i64,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Request to {provider} timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Provider not supported: {provider}")]
    ProviderNotSupported { provider: String },
}

/// Master error type for all MindCanvas errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CanvasError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl CanvasError {
    pub fn not_found(entity_type: EntityType, id: impl std::fmt::Display) -> Self {
        CanvasError::Domain(DomainError::NotFound {
            entity_type,
            id: id.to_string(),
        })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CanvasError::Domain(DomainError::NotFound { .. }))
    }
}

/// Result type alias for MindCanvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

// =============================================================================
// TESTS
// =============================================================================
