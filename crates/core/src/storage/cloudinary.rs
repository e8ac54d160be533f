//! Cloudinary backend talking to the REST upload API.
//!
//! Uploads are converted to WebP with automatic quality and format, and
//! delivery URLs carry the same transformation so they are servable without
//! separate provisioning.

use std::collections::BTreeMap;

use async_trait::async_trait;
use catalog_shared::config::CloudinarySettings;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::error::StorageError;
use super::traits::{FileData, FileStorage};
use super::{check_key, required};

const DELIVERY_HOST: &str = "https://res.cloudinary.com";
const UPLOAD_FORMAT: &str = "webp";
const INCOMING_TRANSFORMATION: &str = "q_auto/f_auto";
const DELIVERY_TRANSFORMATION: &str = "f_auto,q_auto";

/// Stores images in Cloudinary.
pub struct CloudinaryStorage {
    client: reqwest::Client,
    settings: CloudinarySettings,
}

impl std::fmt::Debug for CloudinaryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryStorage")
            .field("cloud_name", &self.settings.cloud_name)
            .field("folder", &self.settings.folder)
            .field("api_secret", &"[hidden]")
            .finish_non_exhaustive()
    }
}

/// Error body returned by the upload API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorMessage {
    message: String,
}

/// Body of a destroy call.
#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

struct Credentials<'a> {
    cloud_name: &'a str,
    api_key: &'a str,
    api_secret: &'a str,
}

impl CloudinaryStorage {
    /// Creates the backend and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if the cloud name is missing or
    /// the HTTP client cannot be built.
    pub fn new(settings: CloudinarySettings) -> Result<Self, StorageError> {
        required(settings.cloud_name.as_deref(), "Cloudinary cloud name")?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("catalog-service/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StorageError::configuration(e.to_string()))?;

        Ok(Self { client, settings })
    }

    fn credentials(&self) -> Result<Credentials<'_>, StorageError> {
        Ok(Credentials {
            cloud_name: required(self.settings.cloud_name.as_deref(), "Cloudinary cloud name")?,
            api_key: required(self.settings.api_key.as_deref(), "Cloudinary API key")?,
            api_secret: required(self.settings.api_secret.as_deref(), "Cloudinary API secret")?,
        })
    }

    fn endpoint(&self, cloud_name: &str, action: &str) -> String {
        format!(
            "{}/v1_1/{cloud_name}/image/{action}",
            self.settings.api_base_url.trim_end_matches('/')
        )
    }

    fn public_id(&self, filename: &str) -> String {
        format!("{}/{filename}", self.settings.folder)
    }

    /// Turns a non-success response into an operation error with the
    /// provider's message.
    async fn check_response(
        response: reqwest::Response,
        action: &str,
    ) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);

        Err(StorageError::operation(format!(
            "Cloudinary {action} failed ({status}): {message}"
        )))
    }
}

/// Signs request parameters: SHA-256 over `k=v` pairs sorted by key and
/// joined with `&`, followed by the API secret.
fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Secure delivery URL with automatic format and quality.
pub(super) fn delivery_url(
    settings: &CloudinarySettings,
    filename: &str,
) -> Result<String, StorageError> {
    let cloud_name = required(settings.cloud_name.as_deref(), "Cloudinary cloud name")?;
    check_key(filename)?;

    Ok(format!(
        "{DELIVERY_HOST}/{cloud_name}/image/upload/{DELIVERY_TRANSFORMATION}/{}/{filename}.{UPLOAD_FORMAT}",
        settings.folder
    ))
}

#[async_trait]
impl FileStorage for CloudinaryStorage {
    async fn upload(&self, data: FileData) -> Result<(), StorageError> {
        check_key(&data.filename)?;
        let creds = self.credentials()?;

        let mut params = BTreeMap::new();
        params.insert("folder", self.settings.folder.clone());
        params.insert("format", UPLOAD_FORMAT.to_string());
        params.insert("public_id", data.filename.clone());
        params.insert("timestamp", Utc::now().timestamp().to_string());
        params.insert("transformation", INCOMING_TRANSFORMATION.to_string());
        let signature = sign(&params, creds.api_secret);

        let size = data.file_data.len();
        let file = Part::bytes(data.file_data.to_vec()).file_name(data.filename.clone());
        let form = params
            .into_iter()
            .fold(Form::new(), |form, (k, v)| form.text(k, v))
            .text("api_key", creds.api_key.to_string())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", file);

        let response = self
            .client
            .post(self.endpoint(creds.cloud_name, "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::operation(format!("Cloudinary upload failed: {e}")))?;
        Self::check_response(response, "upload").await?;

        debug!(filename = %data.filename, size, "Image uploaded to Cloudinary");
        Ok(())
    }

    async fn delete(&self, filename: &str) -> Result<(), StorageError> {
        check_key(filename)?;
        let creds = self.credentials()?;

        let mut params = BTreeMap::new();
        params.insert("public_id", self.public_id(filename));
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = sign(&params, creds.api_secret);

        let mut fields: Vec<(&str, String)> = params.into_iter().collect();
        fields.push(("api_key", creds.api_key.to_string()));
        fields.push(("signature", signature));
        fields.push(("signature_algorithm", "sha256".to_string()));

        let response = self
            .client
            .post(self.endpoint(creds.cloud_name, "destroy"))
            .form(&fields)
            .send()
            .await
            .map_err(|e| StorageError::operation(format!("Cloudinary delete failed: {e}")))?;
        let response = Self::check_response(response, "delete").await?;

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| StorageError::operation(format!("Cloudinary delete failed: {e}")))?;

        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(StorageError::operation(format!(
                "Cloudinary delete failed: unexpected result '{other}'"
            ))),
        }
    }

    fn get_object_uri(&self, filename: &str) -> Result<String, StorageError> {
        delivery_url(&self.settings, filename)
    }

    fn provider_name(&self) -> &'static str {
        "cloudinary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings() -> CloudinarySettings {
        CloudinarySettings {
            cloud_name: Some("demo".into()),
            api_key: Some("123456".into()),
            api_secret: Some("shhh".into()),
            ..CloudinarySettings::default()
        }
    }

    fn settings_for(server: &MockServer) -> CloudinarySettings {
        CloudinarySettings {
            api_base_url: server.uri(),
            ..settings()
        }
    }

    #[test]
    fn test_delivery_url_carries_transformations() {
        let url = delivery_url(&settings(), "4f1c").unwrap();
        assert_eq!(
            url,
            "https://res.cloudinary.com/demo/image/upload/f_auto,q_auto/products/4f1c.webp"
        );
    }

    #[test]
    fn test_delivery_url_requires_cloud_name() {
        for cloud_name in [None, Some(String::new())] {
            let settings = CloudinarySettings {
                cloud_name,
                ..settings()
            };
            assert!(matches!(
                delivery_url(&settings, "4f1c"),
                Err(StorageError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_new_requires_cloud_name() {
        let err = CloudinaryStorage::new(CloudinarySettings::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_sign_sorts_and_appends_secret() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("public_id", "sample".to_string());

        let mut hasher = Sha256::new();
        hasher.update(b"public_id=sample&timestamp=1315060510abcd");
        let expected = format!("{:x}", hasher.finalize());

        assert_eq!(sign(&params, "abcd"), expected);
    }

    #[tokio::test]
    async fn test_upload_posts_signed_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/upload"))
            .and(body_string_contains("products"))
            .and(body_string_contains("q_auto/f_auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "public_id": "products/abc",
                "format": "webp"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let storage = CloudinaryStorage::new(settings_for(&server)).unwrap();
        storage
            .upload(FileData::new("abc", vec![0u8; 16]))
            .await
            .expect("upload should succeed");
    }

    #[tokio::test]
    async fn test_upload_error_carries_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/upload"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "message": "Invalid image file" }
            })))
            .mount(&server)
            .await;

        let storage = CloudinaryStorage::new(settings_for(&server)).unwrap();
        let err = storage
            .upload(FileData::new("abc", vec![0u8; 4]))
            .await
            .unwrap_err();

        match err {
            StorageError::Operation(msg) => assert!(msg.contains("Invalid image file")),
            other => panic!("expected operation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_without_secret_is_configuration_error() {
        let server = MockServer::start().await;
        let storage = CloudinaryStorage::new(CloudinarySettings {
            api_secret: None,
            ..settings_for(&server)
        })
        .unwrap();

        let err = storage
            .upload(FileData::new("abc", vec![0u8; 4]))
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_delete_not_found_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/destroy"))
            .and(body_string_contains("products%2Fghost"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "result": "not found" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let storage = CloudinaryStorage::new(settings_for(&server)).unwrap();
        storage.delete("ghost").await.expect("idempotent delete");
    }

    #[tokio::test]
    async fn test_delete_server_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/destroy"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let storage = CloudinaryStorage::new(settings_for(&server)).unwrap();
        let err = storage.delete("abc").await.unwrap_err();
        assert!(matches!(err, StorageError::Operation(_)));
    }
}
