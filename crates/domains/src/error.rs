//! # AppError
//!
//! Centralized error handling for the DevConnector services.
//! Maps domain-specific failures to actionable error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The primary error type for all service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed or missing input, one entry per offending field
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldViolation>),

    /// Referenced aggregate or sub-entity is absent
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Authenticated identity does not own the target
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Missing or invalid credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// State clash (duplicate like, stale aggregate version, taken email)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(what.to_string(), id.to_string())
    }
}

/// A specialized Result type for DevConnector logic.
pub type Result<T> = std::result::Result<T, AppError>;

/// Failures reported by document-store adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} already exists for {key}")]
    Duplicate { entity: &'static str, key: String },

    /// The stored document changed since it was loaded.
    #[error("{entity} {id} was modified concurrently")]
    VersionConflict { entity: &'static str, id: String },

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity, id } => AppError::NotFound(entity.to_string(), id),
            RepoError::Duplicate { entity, .. } => {
                AppError::Conflict(format!("{entity} already exists"))
            }
            RepoError::VersionConflict { entity, .. } => {
                AppError::Conflict(format!("{entity} was modified concurrently, reload and retry"))
            }
            RepoError::Backend(msg) => AppError::Internal(msg),
        }
    }
}
