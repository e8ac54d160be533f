//! Entity image handling on top of [`FileStorage`].

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::error::CatalogError;
use crate::storage::{FileData, FileStorage};

/// Message returned for uploads that are not images.
pub const NOT_AN_IMAGE: &str = "Only image files are allowed";

/// An image received with a create or update request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Raw image bytes.
    pub bytes: Bytes,
    /// Client-declared content type, if any.
    pub content_type: Option<String>,
}

impl ImageUpload {
    /// Creates an upload from raw bytes and their declared MIME type.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: Some(content_type.into()),
        }
    }

    /// The declared MIME type, normalized, if it names an image.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` when the type is missing or not `image/*`.
    pub fn image_type(&self) -> Result<String, CatalogError> {
        let essence = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match essence.strip_prefix("image/") {
            Some(subtype) if !subtype.is_empty() && !subtype.contains('/') => Ok(essence),
            _ => Err(CatalogError::validation(NOT_AN_IMAGE)),
        }
    }
}

/// Stores, swaps and resolves entity images through the active backend.
#[derive(Clone)]
pub struct ImageStore {
    storage: Arc<dyn FileStorage>,
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("provider", &self.storage.provider_name())
            .finish()
    }
}

impl ImageStore {
    /// Wraps a storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }

    /// Uploads an image under a fresh UUID filename and returns the filename.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for non-image uploads and
    /// `CatalogError::ImageUpload` if the backend rejects the upload.
    pub async fn put(&self, image: ImageUpload) -> Result<String, CatalogError> {
        let content_type = image.image_type()?;
        let filename = Uuid::new_v4().to_string();
        let size = image.bytes.len();

        let data = FileData::new(filename.clone(), image.bytes).with_content_type(content_type);
        self.storage.upload(data).await.map_err(|e| {
            error!(
                provider = self.storage.provider_name(),
                filename = %filename,
                kind = if e.is_configuration() { "configuration" } else { "storage" },
                error = %e,
                "Image upload failed"
            );
            CatalogError::ImageUpload(e)
        })?;

        info!(
            provider = self.storage.provider_name(),
            filename = %filename,
            size,
            "Image uploaded"
        );
        Ok(filename)
    }

    /// Uploads `image`, then hands its filename to `persist`.
    ///
    /// When `persist` fails the uploaded object stays in place and is logged
    /// as orphaned.
    ///
    /// # Errors
    ///
    /// Returns the upload error (nothing persisted) or the `persist` error.
    pub async fn store_with<T, F, Fut>(
        &self,
        image: ImageUpload,
        persist: F,
    ) -> Result<T, CatalogError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        let filename = self.put(image).await?;

        persist(filename.clone())
            .await
            .inspect_err(|e| self.report_orphan(&filename, e))
    }

    /// Points a record at a new image, or keeps `current` when `image` is
    /// `None`.
    ///
    /// The sequence is upload, persist, then delete `current` exactly once.
    /// It is not atomic: a failed persist orphans the new object, and a
    /// failed delete leaves the record on the new image with the old object
    /// still stored.
    ///
    /// # Errors
    ///
    /// Returns the upload error, the `persist` error, or
    /// `CatalogError::Storage` when `current` cannot be deleted.
    pub async fn replace_with<T, F, Fut>(
        &self,
        current: &str,
        image: Option<ImageUpload>,
        persist: F,
    ) -> Result<T, CatalogError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        let Some(image) = image else {
            return persist(current.to_string()).await;
        };

        let filename = self.put(image).await?;

        let saved = persist(filename.clone())
            .await
            .inspect_err(|e| self.report_orphan(&filename, e))?;

        self.discard(current).await.inspect_err(|_| {
            error!(
                old_filename = %current,
                new_filename = %filename,
                "Record updated but its previous image is still stored"
            );
        })?;

        Ok(saved)
    }

    /// Deletes an image that a record no longer references.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the backend fails; a missing object
    /// is not a failure.
    pub async fn discard(&self, filename: &str) -> Result<(), CatalogError> {
        self.storage.delete(filename).await.map_err(|e| {
            error!(
                provider = self.storage.provider_name(),
                filename = %filename,
                error = %e,
                "Replaced image could not be deleted; object is now orphaned"
            );
            CatalogError::Storage(e)
        })?;

        info!(
            provider = self.storage.provider_name(),
            filename = %filename,
            "Replaced image deleted"
        );
        Ok(())
    }

    /// Logs an uploaded image that will never be referenced because the
    /// record write failed. The object is left in place.
    pub fn report_orphan(&self, filename: &str, cause: &CatalogError) {
        warn!(
            provider = self.storage.provider_name(),
            filename = %filename,
            error = %cause,
            "Image uploaded but record was not saved; object is orphaned"
        );
    }

    /// Resolves the public URL of a stored image.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` wrapping a configuration error when the
    /// backend's location settings are missing.
    pub fn resolve(&self, filename: &str) -> Result<String, CatalogError> {
        self.storage.get_object_uri(filename).map_err(|e| {
            error!(
                provider = self.storage.provider_name(),
                kind = if e.is_configuration() { "configuration" } else { "storage" },
                error = %e,
                "Image URL could not be resolved"
            );
            CatalogError::Storage(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingStorage;
    use rstest::rstest;

    fn store() -> (ImageStore, Arc<RecordingStorage>) {
        let storage = Arc::new(RecordingStorage::default());
        (ImageStore::new(storage.clone()), storage)
    }

    #[rstest]
    #[case("image/webp", "image/webp")]
    #[case("IMAGE/PNG", "image/png")]
    #[case("image/jpeg; charset=binary", "image/jpeg")]
    fn test_image_type_accepts_images(#[case] declared: &str, #[case] expected: &str) {
        let upload = ImageUpload::new(b"x".to_vec(), declared);
        assert_eq!(upload.image_type().unwrap(), expected);
    }

    #[rstest]
    #[case(Some("application/pdf"))]
    #[case(Some("text/plain"))]
    #[case(Some("image/"))]
    #[case(None)]
    fn test_image_type_rejects_everything_else(#[case] declared: Option<&str>) {
        let upload = ImageUpload {
            bytes: Bytes::from_static(b"x"),
            content_type: declared.map(str::to_string),
        };
        let err = upload.image_type().unwrap_err();
        assert!(matches!(err, CatalogError::Validation(msg) if msg == NOT_AN_IMAGE));
    }

    #[tokio::test]
    async fn test_put_rejects_non_image_without_uploading() {
        let (images, storage) = store();

        let err = images
            .put(ImageUpload::new(b"%PDF".to_vec(), "application/pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(storage.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_put_passes_content_type_to_backend() {
        let (images, storage) = store();

        images
            .put(ImageUpload::new(b"webp".to_vec(), "image/webp"))
            .await
            .unwrap();

        assert_eq!(storage.content_types(), vec![Some("image/webp".to_string())]);
    }

    #[tokio::test]
    async fn test_replace_with_without_image_keeps_current() {
        let (images, storage) = store();

        let saved = images
            .replace_with("old", None, |name| async move { Ok(name) })
            .await
            .unwrap();

        assert_eq!(saved, "old");
        assert!(storage.uploads().is_empty());
        assert!(storage.deletes().is_empty());
    }

    #[tokio::test]
    async fn test_replace_with_persist_failure_keeps_current_object() {
        let (images, storage) = store();
        let image = ImageUpload::new(b"webp".to_vec(), "image/webp");

        let err = images
            .replace_with("old", Some(image), |_| async {
                Err::<(), _>(CatalogError::repository("connection reset"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Repository(_)));
        assert_eq!(storage.uploads().len(), 1);
        assert!(storage.deletes().is_empty());
    }
}
