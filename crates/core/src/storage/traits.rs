//! The storage capability every backend implements.

use async_trait::async_trait;
use bytes::Bytes;

use super::error::StorageError;

/// An object to persist, keyed by a caller-assigned filename.
#[derive(Debug, Clone)]
pub struct FileData {
    /// Object key. Generated by the caller, usually a UUID.
    pub filename: String,
    /// Raw object bytes.
    pub file_data: Bytes,
    /// MIME type recorded with the object where the backend supports it.
    pub content_type: Option<String>,
}

impl FileData {
    /// Creates a new upload payload.
    #[must_use]
    pub fn new(filename: impl Into<String>, file_data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            file_data: file_data.into(),
            content_type: None,
        }
    }

    /// Sets the MIME type stored with the object.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Object storage backend for entity images.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Persists the object under `data.filename` with a single atomic put.
    ///
    /// Either the whole object is stored or an error is returned.
    async fn upload(&self, data: FileData) -> Result<(), StorageError>;

    /// Removes an object. Removing a missing object succeeds.
    async fn delete(&self, filename: &str) -> Result<(), StorageError>;

    /// Resolves the public URL of an object without touching the network.
    ///
    /// Fails with `StorageError::Configuration` when the backend's location
    /// settings are absent.
    fn get_object_uri(&self, filename: &str) -> Result<String, StorageError>;

    /// Short backend name for logs.
    fn provider_name(&self) -> &'static str;
}
