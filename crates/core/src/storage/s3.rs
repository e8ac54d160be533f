//! S3 backend built on an OpenDAL operator.

use async_trait::async_trait;
use catalog_shared::config::S3Settings;
use opendal::{ErrorKind, Operator, services};
use tracing::debug;

use super::error::StorageError;
use super::traits::{FileData, FileStorage};
use super::{check_key, required};

/// Stores images in an S3 bucket.
pub struct S3Storage {
    operator: Operator,
    settings: S3Settings,
}

impl std::fmt::Debug for S3Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Storage")
            .field("bucket", &self.settings.bucket)
            .field("region", &self.settings.region)
            .field("endpoint", &self.settings.endpoint)
            .finish_non_exhaustive()
    }
}

impl S3Storage {
    /// Creates the backend and its client from settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if bucket or region is missing
    /// or the operator cannot be built.
    pub fn new(settings: S3Settings) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&settings)?;
        Ok(Self { operator, settings })
    }

    fn create_operator(settings: &S3Settings) -> Result<Operator, StorageError> {
        let bucket = required(settings.bucket.as_deref(), "S3 bucket")?;
        let region = required(settings.region.as_deref(), "S3 region")?;

        let mut builder = services::S3::default().bucket(bucket).region(region);

        if let Some(endpoint) = settings.endpoint.as_deref().filter(|e| !e.is_empty()) {
            builder = builder.endpoint(endpoint);
        }

        // Static keys win; otherwise fall back to the ambient AWS credential chain.
        if let (Some(key_id), Some(secret)) = (
            settings.access_key_id.as_deref(),
            settings.secret_access_key.as_deref(),
        ) {
            builder = builder
                .access_key_id(key_id)
                .secret_access_key(secret)
                .disable_config_load()
                .disable_ec2_metadata();
        }

        Ok(Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish())
    }
}

/// Virtual-hosted-style public URL of an object.
pub(super) fn object_uri(settings: &S3Settings, filename: &str) -> Result<String, StorageError> {
    let bucket = required(settings.bucket.as_deref(), "S3 bucket")?;
    let region = required(settings.region.as_deref(), "S3 region")?;
    check_key(filename)?;

    Ok(format!("https://{bucket}.s3.{region}.amazonaws.com/{filename}"))
}

#[async_trait]
impl FileStorage for S3Storage {
    async fn upload(&self, data: FileData) -> Result<(), StorageError> {
        check_key(&data.filename)?;
        let size = data.file_data.len();

        let mut write = self.operator.write_with(&data.filename, data.file_data);
        if let Some(content_type) = data.content_type.as_deref() {
            write = write.content_type(content_type);
        }
        write.await.map_err(StorageError::from)?;

        debug!(filename = %data.filename, size, "Object written to S3");
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
        object_uri(&self.settings, filename)
    }

    fn provider_name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings() -> S3Settings {
        S3Settings {
            bucket: Some("catalog-images".into()),
            region: Some("eu-west-1".into()),
            access_key_id: Some("AKIAEXAMPLE".into()),
            secret_access_key: Some("secret".into()),
            endpoint: None,
        }
    }

    fn settings_for(server: &MockServer) -> S3Settings {
        S3Settings {
            bucket: Some("catalog".into()),
            region: Some("us-east-1".into()),
            endpoint: Some(server.uri()),
            ..settings()
        }
    }

    #[test]
    fn test_object_uri_virtual_hosted_style() {
        let uri = object_uri(&settings(), "5f0c1e2a-image").unwrap();
        assert_eq!(
            uri,
            "https://catalog-images.s3.eu-west-1.amazonaws.com/5f0c1e2a-image"
        );
    }

    #[test]
    fn test_object_uri_requires_bucket_and_region() {
        let no_bucket = S3Settings {
            bucket: None,
            ..settings()
        };
        let empty_region = S3Settings {
            region: Some(String::new()),
            ..settings()
        };

        assert!(matches!(
            object_uri(&no_bucket, "a"),
            Err(StorageError::Configuration(_))
        ));
        assert!(matches!(
            object_uri(&empty_region, "a"),
            Err(StorageError::Configuration(_))
        ));
    }

    #[test]
    fn test_new_without_region_is_configuration_error() {
        let err = S3Storage::new(S3Settings {
            region: None,
            ..settings()
        })
        .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_get_object_uri_matches_settings() {
        let storage = S3Storage::new(settings()).unwrap();
        assert_eq!(
            storage.get_object_uri("abc").unwrap(),
            "https://catalog-images.s3.eu-west-1.amazonaws.com/abc"
        );
        assert_eq!(storage.provider_name(), "s3");
    }

    #[tokio::test]
    async fn test_upload_issues_single_put() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/catalog/new-image"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let storage = S3Storage::new(settings_for(&server)).unwrap();
        storage
            .upload(FileData::new("new-image", vec![1u8, 2, 3]))
            .await
            .expect("upload should succeed");
    }

    #[tokio::test]
    async fn test_upload_sends_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/catalog/typed-image"))
            .and(header("content-type", "image/webp"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let storage = S3Storage::new(settings_for(&server)).unwrap();
        storage
            .upload(FileData::new("typed-image", vec![1u8]).with_content_type("image/webp"))
            .await
            .expect("upload should carry the content type");
    }

    #[tokio::test]
    async fn test_upload_failure_is_operation_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                "<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>",
            ))
            .mount(&server)
            .await;

        let storage = S3Storage::new(settings_for(&server)).unwrap();
        let err = storage
            .upload(FileData::new("new-image", vec![1u8]))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Operation(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_object_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                "<Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message></Error>",
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(query_param("delete", ""))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?><DeleteResult></DeleteResult>",
            ))
            .mount(&server)
            .await;

        let storage = S3Storage::new(settings_for(&server)).unwrap();
        storage
            .delete("never-uploaded")
            .await
            .expect("deleting a missing object is not an error");
    }
}
