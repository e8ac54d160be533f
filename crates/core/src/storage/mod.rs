//! Object storage for entity images.
//!
//! Every backend implements [`FileStorage`]: upload an object under a
//! caller-chosen filename, delete it, and resolve the public URL clients use
//! to fetch it. The backend is chosen once at startup from configuration and
//! injected as `Arc<dyn FileStorage>`; nothing downstream branches on it.
//!
//! | Backend | Client | Public URL |
//! |---|---|---|
//! | [`S3Storage`] | OpenDAL `services::S3` | `https://{bucket}.s3.{region}.amazonaws.com/{key}` |
//! | [`CloudinaryStorage`] | `reqwest` against the upload API | `https://res.cloudinary.com/{cloud}/image/upload/...` |
//! | [`LocalStorage`] | OpenDAL `services::Fs` | `{public_url}/{key}` |

mod cloudinary;
mod error;
mod local;
mod s3;
mod traits;

use std::sync::Arc;

use catalog_shared::config::{StorageBackendKind, StorageSettings};

pub use cloudinary::CloudinaryStorage;
pub use error::StorageError;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{FileData, FileStorage};

/// Builds the configured storage backend.
///
/// # Errors
///
/// Returns `StorageError::Configuration` if the selected backend's settings
/// cannot produce a client.
pub fn from_settings(settings: &StorageSettings) -> Result<Arc<dyn FileStorage>, StorageError> {
    let storage: Arc<dyn FileStorage> = match settings.backend {
        StorageBackendKind::S3 => Arc::new(S3Storage::new(settings.s3.clone())?),
        StorageBackendKind::Cloudinary => {
            Arc::new(CloudinaryStorage::new(settings.cloudinary.clone())?)
        }
        StorageBackendKind::Local => Arc::new(LocalStorage::new(settings.local.clone())?),
    };
    Ok(storage)
}

/// Returns the value of a required location setting.
fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, StorageError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StorageError::configuration(format!("{what} is not configured"))),
    }
}

/// Rejects keys that could escape the backend's namespace.
fn check_key(filename: &str) -> Result<(), StorageError> {
    if filename.is_empty() || filename.contains("..") || filename.starts_with('/') {
        return Err(StorageError::InvalidKey(filename.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_shared::config::S3Settings;

    #[test]
    fn test_required_rejects_blank() {
        assert!(required(Some("bucket"), "bucket").is_ok());
        assert!(matches!(
            required(Some("   "), "bucket"),
            Err(StorageError::Configuration(_))
        ));
        assert!(matches!(
            required(None, "bucket"),
            Err(StorageError::Configuration(_))
        ));
    }

    #[test]
    fn test_check_key() {
        assert!(check_key("4b0f5a7c-8d3e-4a8e-9a57-1f0d2c3b4a5e").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("../etc/passwd").is_err());
        assert!(check_key("/abs").is_err());
    }

    #[test]
    fn test_from_settings_s3_without_bucket_is_configuration_error() {
        let settings = StorageSettings {
            backend: StorageBackendKind::S3,
            s3: S3Settings {
                region: Some("eu-west-1".into()),
                ..S3Settings::default()
            },
            ..StorageSettings::default()
        };

        let err = from_settings(&settings).err().expect("should fail");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_from_settings_picks_backend() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = StorageSettings::default();
        settings.local.root = dir.path().to_string_lossy().into_owned();

        let storage = from_settings(&settings).unwrap();
        assert_eq!(storage.provider_name(), "local");
    }
}
