//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Cross-origin settings.
    #[serde(default)]
    pub cors: CorsConfig,
    /// Upload limits.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Object storage backend selection and settings.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4001
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    3600
}

/// Cross-origin request configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to send credentialed requests.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Upload size limits.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum image size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_max_file_size() -> usize {
    500 * 1024
}

/// Which object storage backend holds entity images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackendKind {
    /// S3-compatible object store.
    S3,
    /// Cloudinary media API.
    Cloudinary,
    /// Local filesystem (development only).
    #[default]
    Local,
}

/// Object storage settings.
///
/// Location fields are optional here so that a missing value surfaces as a
/// storage configuration error from the backend instead of failing the whole
/// config load.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// Active backend.
    #[serde(default)]
    pub backend: StorageBackendKind,
    /// S3 settings.
    #[serde(default)]
    pub s3: S3Settings,
    /// Cloudinary settings.
    #[serde(default)]
    pub cloudinary: CloudinarySettings,
    /// Local filesystem settings.
    #[serde(default)]
    pub local: LocalStorageSettings,
}

/// S3 backend settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3Settings {
    /// Bucket name.
    pub bucket: Option<String>,
    /// AWS region.
    pub region: Option<String>,
    /// Access key ID.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Custom endpoint for S3-compatible stores (MinIO, R2).
    pub endpoint: Option<String>,
}

/// Cloudinary backend settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudinarySettings {
    /// Cloud name, part of every delivery URL.
    pub cloud_name: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// API secret used to sign requests.
    pub api_secret: Option<String>,
    /// Folder that namespaces uploaded images.
    #[serde(default = "default_cloudinary_folder")]
    pub folder: String,
    /// Base URL of the upload API.
    #[serde(default = "default_cloudinary_api_base")]
    pub api_base_url: String,
}

impl Default for CloudinarySettings {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            folder: default_cloudinary_folder(),
            api_base_url: default_cloudinary_api_base(),
        }
    }
}

fn default_cloudinary_folder() -> String {
    "products".to_string()
}

fn default_cloudinary_api_base() -> String {
    "https://api.cloudinary.com".to_string()
}

/// Local filesystem backend settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalStorageSettings {
    /// Directory that receives uploads.
    #[serde(default = "default_local_root")]
    pub root: String,
    /// Public URL prefix the directory is served under.
    #[serde(default = "default_local_public_url")]
    pub public_url: String,
}

impl Default for LocalStorageSettings {
    fn default() -> Self {
        Self {
            root: default_local_root(),
            public_url: default_local_public_url(),
        }
    }
}

fn default_local_root() -> String {
    "./uploads".to_string()
}

fn default_local_public_url() -> String {
    "http://localhost:4001/uploads".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("CATALOG")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
