//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for products and toppings
//! - Token authentication and role checks
//! - Multipart form extraction with an image size limit
//! - The single mapping from errors to HTTP responses

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
};
use catalog_core::storage::FileStorage;
use catalog_shared::JwtService;
use sea_orm::DatabaseConnection;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Room left in the request body for the text fields next to the image.
pub const FORM_FIELDS_ALLOWANCE: usize = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Active image storage backend.
    pub storage: Arc<dyn FileStorage>,
    /// Largest accepted image, in bytes.
    pub max_file_size: usize,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("storage", &self.storage.provider_name())
            .field("max_file_size", &self.max_file_size)
            .finish_non_exhaustive()
    }
}

/// Options for the outer HTTP layers.
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Origins allowed to call the API with credentials.
    pub allowed_origins: Vec<String>,
    /// Directory to serve at `/uploads`, when images are stored locally.
    pub uploads_dir: Option<String>,
}

/// Creates the main application router.
pub fn create_router(state: AppState, options: &RouterOptions) -> Router {
    let body_limit = state.max_file_size.saturating_add(FORM_FIELDS_ALLOWANCE);

    let mut router = routes::api_routes();
    if let Some(dir) = &options.uploads_dir {
        router = router.nest_service("/uploads", ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
        .layer(cors_layer(&options.allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| warn!(origin = %origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[cfg(test)]
mod test_support;
