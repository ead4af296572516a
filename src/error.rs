//! Error types for Folio.
//!
//! Validation, lookup, storage and dependency failures are fatal to the
//! call that hit them and surface here. Degraded assets during export are
//! not errors; see [`crate::export::AssetWarning`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Folio operations.
pub type Result<T> = std::result::Result<T, FolioError>;

/// Errors that can occur in Folio.
#[derive(Error, Debug)]
pub enum FolioError {
    // Validation Errors
    #[error("Validation failed for '{field}': {reason}")]
    Validation { field: String, reason: String },

    // Lookup Errors
    #[error("Portfolio not found: {id}")]
    PortfolioNotFound { id: String },

    #[error("Version {version_id} not found for portfolio {portfolio_id}")]
    VersionNotFound {
        portfolio_id: String,
        version_id: String,
    },

    // Storage Errors
    #[error("Storage is full: writing '{key}' needs {needed_bytes} bytes, limit is {limit_bytes} bytes")]
    StorageQuota {
        key: String,
        needed_bytes: usize,
        limit_bytes: usize,
    },

    #[error("Storage verification failed for '{key}': {reason}")]
    StorageIntegrity { key: String, reason: String },

    #[error("Failed to save '{key}': {reason}")]
    StorageWrite { key: String, reason: String },

    // Dependency Errors
    #[error("Required capability is not available: {dependency}")]
    DependencyMissing { dependency: String },

    #[error("Rasterization failed: {reason}")]
    RasterizationFailed { reason: String },

    // File Errors
    #[error("Failed to read file: {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Serialization Errors
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FolioError {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FolioError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a missing collaborator.
    pub fn dependency_missing(dependency: impl Into<String>) -> Self {
        FolioError::DependencyMissing {
            dependency: dependency.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FolioError::Validation { .. } => "VALIDATION_ERROR",
            FolioError::PortfolioNotFound { .. } => "PORTFOLIO_NOT_FOUND",
            FolioError::VersionNotFound { .. } => "VERSION_NOT_FOUND",
            FolioError::StorageQuota { .. } => "STORAGE_QUOTA_EXCEEDED",
            FolioError::StorageIntegrity { .. } => "STORAGE_INTEGRITY",
            FolioError::StorageWrite { .. } => "STORAGE_WRITE",
            FolioError::DependencyMissing { .. } => "DEPENDENCY_MISSING",
            FolioError::RasterizationFailed { .. } => "RASTERIZATION_FAILED",
            FolioError::FileRead { .. } => "FILE_READ",
            FolioError::FileWrite { .. } => "FILE_WRITE",
            FolioError::DirectoryCreate { .. } => "DIRECTORY_CREATE",
            FolioError::Serialization(_) => "SERIALIZATION_ERROR",
            FolioError::Io(_) => "IO_ERROR",
        }
    }

    /// Returns true if this error indicates the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FolioError::StorageQuota { .. }
                | FolioError::StorageWrite { .. }
                | FolioError::FileWrite { .. }
        )
    }

    /// Returns true for lookups that failed because an id is unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FolioError::PortfolioNotFound { .. } | FolioError::VersionNotFound { .. }
        )
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            FolioError::Validation { .. } => Some("Fill in the required fields and save again."),
            FolioError::StorageQuota { .. } => Some(
                "Local storage is full. Delete old portfolios or export them to files, then save again.",
            ),
            FolioError::StorageIntegrity { .. } => {
                Some("The saved data could not be verified. Export your work before retrying.")
            }
            FolioError::DependencyMissing { .. } => {
                Some("Configure the missing rendering capability before exporting.")
            }
            FolioError::PortfolioNotFound { .. } => {
                Some("The portfolio may have been deleted. Reload the library.")
            }
            _ => None,
        }
    }
}
