//! Local filesystem backend for development.

use async_trait::async_trait;
use catalog_shared::config::LocalStorageSettings;
use opendal::{ErrorKind, Operator, services};

use super::error::StorageError;
use super::traits::{FileData, FileStorage};
use super::{check_key, required};

/// Stores images in a local directory served by the API under `/uploads`.
#[derive(Debug)]
pub struct LocalStorage {
    operator: Operator,
    settings: LocalStorageSettings,
}

impl LocalStorage {
    /// Creates the backend rooted at `settings.root`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if the root is empty or the
    /// operator cannot be built.
    pub fn new(settings: LocalStorageSettings) -> Result<Self, StorageError> {
        let root = required(Some(settings.root.as_str()), "local storage root")?;
        let builder = services::Fs::default().root(root);

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        Ok(Self { operator, settings })
    }
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn upload(&self, data: FileData) -> Result<(), StorageError> {
        check_key(&data.filename)?;
        // Fs keeps no object metadata, so the content type is not recorded.
        self.operator
            .write(&data.filename, data.file_data)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        check_key(filename)?;
        match self.operator.delete(filename).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    fn get_object_uri(&self, filename: &str) -> Result<String, StorageError> {
        let base = required(Some(self.settings.public_url.as_str()), "local public URL")?;
        check_key(filename)?;
        Ok(format!("{}/{filename}", base.trim_end_matches('/')))
    }

    fn provider_name(&self) -> &'static str {
        "local"
    }
}
