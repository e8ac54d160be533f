//! Catalog API Server
//!
//! Main entry point for the catalog service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use catalog_api::{AppState, RouterOptions, create_router};
use catalog_core::storage;
use catalog_db::connect_with;
use catalog_shared::config::StorageBackendKind;
use catalog_shared::{AppConfig, JwtConfig, JwtService};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "catalog=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60)
            .unwrap_or(i64::MAX),
    });

    // Fail fast on missing bucket/cloud settings instead of on first request
    let file_storage = storage::from_settings(&config.storage)
        .context("Failed to initialise image storage")?;
    info!(
        provider = file_storage.provider_name(),
        max_file_size = config.upload.max_file_size,
        "Image storage configured"
    );

    let uploads_dir = (config.storage.backend == StorageBackendKind::Local)
        .then(|| config.storage.local.root.clone());

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        storage: file_storage,
        max_file_size: config.upload.max_file_size,
    };

    let app = create_router(
        state,
        &RouterOptions {
            allowed_origins: config.cors.allowed_origins.clone(),
            uploads_dir,
        },
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
