//! Catalog error types.

use thiserror::Error;
use uuid::Uuid;

use crate::storage::StorageError;

/// Catalog operation errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Request input is invalid.
    #[error("{0}")]
    Validation(String),

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind.
        entity: &'static str,
        /// Requested ID.
        id: Uuid,
    },

    /// Actor may not touch this entity.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The new image could not be stored; nothing was persisted.
    #[error("image upload failed: {0}")]
    ImageUpload(#[source] StorageError),

    /// Any other storage failure (delete, URL resolution).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl CatalogError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Create a forbidden error.
    #[must_use]
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// The storage error underneath, if any.
    #[must_use]
    pub fn storage_source(&self) -> Option<&StorageError> {
        match self {
            Self::ImageUpload(e) | Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}
