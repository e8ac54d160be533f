//! API route definitions.

use axum::Router;
use serde::Serialize;
use uuid::Uuid;

use crate::AppState;

pub mod health;
pub mod products;
pub mod toppings;

/// Body returned by create and update endpoints.
#[derive(Debug, Serialize)]
pub struct IdResponse {
    /// ID of the created or updated entity.
    pub id: Uuid,
}

/// Parses the `isPublished` list filter. Anything but `true`/`false` is
/// ignored.
pub(crate) fn published_filter(raw: Option<&str>) -> Option<bool> {
    match raw.map(str::trim) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

/// Creates the router with all catalog routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(products::routes())
        .merge(toppings::routes())
}
