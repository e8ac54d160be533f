//! HTTP error responses.
//!
//! Every handler error ends up here as an [`ApiError`]; this is the only
//! place that turns errors into status codes and JSON bodies.

use axum::{
    Json,
    extract::{
        multipart::MultipartRejection,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use catalog_core::catalog::CatalogError;
use catalog_shared::AppError;
use serde_json::json;
use tracing::{debug, error};

/// Error returned by handlers and extractors.
#[derive(Debug)]
pub struct ApiError(AppError);

impl ApiError {
    /// 400 with a client-facing message.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self(AppError::Validation(msg.into()))
    }

    /// 401 with a client-facing message.
    #[must_use]
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(AppError::Unauthorized(msg.into()))
    }

    /// 403 with a client-facing message.
    #[must_use]
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self(AppError::Forbidden(msg.into()))
    }

    /// Maps an extractor rejection onto the uniform error body.
    fn rejected(status: StatusCode, body: String) -> Self {
        if status.is_server_error() {
            Self(AppError::Internal(body))
        } else {
            Self::validation(body)
        }
    }

    /// The wrapped application error.
    #[must_use]
    pub fn inner(&self) -> &AppError {
        &self.0
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let app = match &err {
            CatalogError::Validation(msg) => AppError::Validation(msg.clone()),
            CatalogError::NotFound { entity, .. } => {
                AppError::NotFound(format!("{} not found", capitalize(entity)))
            }
            CatalogError::Forbidden(msg) => AppError::Forbidden(msg.clone()),
            CatalogError::ImageUpload(e) | CatalogError::Storage(e) if e.is_configuration() => {
                AppError::Configuration(err.to_string())
            }
            CatalogError::ImageUpload(_) | CatalogError::Storage(_) => {
                AppError::Storage(err.to_string())
            }
            CatalogError::Repository(msg) => AppError::Database(msg.clone()),
        };
        Self(app)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if err.is_server_error() {
            error!(kind = err.log_kind(), error = %err, "Request failed");
        } else {
            debug!(kind = err.log_kind(), error = %err, "Request rejected");
        }

        (
            status,
            Json(json!({
                "error": err.error_code(),
                "message": err.public_message(),
            })),
        )
            .into_response()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
