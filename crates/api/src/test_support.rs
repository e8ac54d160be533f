//! Helpers for router tests that never reach the database.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use catalog_core::storage::LocalStorage;
use catalog_shared::config::LocalStorageSettings;
use catalog_shared::{JwtConfig, JwtService, Role};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use tower::ServiceExt;

use crate::{AppState, RouterOptions, create_router};

pub const BOUNDARY: &str = "catalog-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub jwt: Arc<JwtService>,
    pub uploads: tempfile::TempDir,
}

impl TestApp {
    pub fn new(max_file_size: usize) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(LocalStorageSettings {
            root: uploads.path().to_string_lossy().into_owned(),
            public_url: "http://localhost:4001/uploads".into(),
        })
        .unwrap();
        let jwt = Arc::new(JwtService::new(JwtConfig {
            secret: "router-test-secret".into(),
            access_token_expires_minutes: 5,
        }));

        let state = AppState {
            db: Arc::new(DatabaseConnection::default()),
            jwt_service: jwt.clone(),
            storage: Arc::new(storage),
            max_file_size,
        };

        Self {
            router: create_router(state, &RouterOptions::default()),
            jwt,
            uploads,
        }
    }

    pub fn token(&self, role: Role, tenant: Option<&str>) -> String {
        self.jwt.generate_access_token("42", role, tenant).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (u16, serde_json::Value) {
        let response: Response<Body> = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

/// Builds a multipart body from text fields and an optional image.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"pizza.webp\"\r\nContent-Type: image/webp\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Vec<u8>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}
