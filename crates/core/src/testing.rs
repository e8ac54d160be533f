//! Test doubles shared by the service tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::storage::{FileData, FileStorage, StorageError};

/// In-memory [`FileStorage`] that records every call.
#[derive(Debug, Default)]
pub(crate) struct RecordingStorage {
    pub uploads: Mutex<Vec<String>>,
    pub content_types: Mutex<Vec<Option<String>>>,
    pub deletes: Mutex<Vec<String>>,
    pub fail_upload: bool,
    pub fail_delete: bool,
    pub unconfigured: bool,
}

impl RecordingStorage {
    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    pub fn failing_delete() -> Self {
        Self {
            fail_delete: true,
            ..Self::default()
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn content_types(&self) -> Vec<Option<String>> {
        self.content_types.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileStorage for RecordingStorage {
    async fn upload(&self, data: FileData) -> Result<(), StorageError> {
        if self.fail_upload {
            return Err(StorageError::operation("bucket unreachable"));
        }
        self.content_types.lock().unwrap().push(data.content_type);
        self.uploads.lock().unwrap().push(data.filename);
        Ok(())
    }

    async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        self.deletes.lock().unwrap().push(filename.to_string());
        if self.fail_delete {
            return Err(StorageError::operation("delete refused"));
        }
        Ok(())
    }

    fn get_object_uri(&self, filename: &str) -> Result<String, StorageError> {
        if self.unconfigured {
            return Err(StorageError::configuration("bucket is not configured"));
        }
        Ok(format!("https://cdn.test/{filename}"))
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}
