//! Topping routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    routing::get,
};
use axum_extra::extract::WithRejection;
use catalog_core::catalog::ImageUpload;
use catalog_core::topping::{ToppingFilter, ToppingInput, ToppingService, ToppingView};
use catalog_db::ToppingRepository;
use catalog_shared::types::{PageRequest, PageResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{IdResponse, published_filter};
use crate::{
    AppState,
    error::ApiError,
    extractors::{MultipartForm, validation_message},
    middleware::CatalogEditor,
};

/// Creates the topping routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/toppings", get(list_toppings).post(create_topping))
        .route("/toppings/{id}", get(get_topping).put(update_topping))
}

fn service(state: &AppState) -> ToppingService<ToppingRepository> {
    ToppingService::new(
        state.storage.clone(),
        Arc::new(ToppingRepository::new(state.db.as_ref().clone())),
    )
}

/// Text fields of the topping create/update form.
#[derive(Debug, Validate)]
pub struct ToppingForm {
    /// Display name.
    #[validate(length(min = 1, message = "Topping name is required"))]
    pub name: String,
    /// Decimal price as text.
    #[validate(length(min = 1, message = "Topping price is required"))]
    pub price: String,
    /// Owning tenant.
    #[validate(length(min = 1, message = "Tenant id is required"))]
    pub tenant_id: String,
    /// Published flag.
    pub is_published: bool,
}

impl ToppingForm {
    /// Splits a multipart form into validated topping input and the image.
    ///
    /// # Errors
    ///
    /// Returns a 400 `ApiError` for missing or malformed fields.
    pub fn parse(mut form: MultipartForm) -> Result<(ToppingInput, Option<ImageUpload>), ApiError> {
        let fields = Self {
            name: form.text_or_empty("name").trim().to_string(),
            price: form.text_or_empty("price").trim().to_string(),
            tenant_id: form.text_or_empty("tenantId").trim().to_string(),
            is_published: form.flag("isPublished")?,
        };
        fields
            .validate()
            .map_err(|e| ApiError::validation(validation_message(&e)))?;

        let input = ToppingInput {
            price: ToppingInput::parse_price(&fields.price)?,
            tenant_id: fields.tenant_id,
            name: fields.name,
            is_published: fields.is_published,
        };
        Ok((input, form.take_image()))
    }
}

/// Query parameters for listing toppings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToppingListQuery {
    /// Tenant filter.
    pub tenant_id: Option<String>,
    /// `true` or `false`.
    pub is_published: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
}

/// POST `/toppings`
async fn create_topping(
    State(state): State<AppState>,
    editor: CatalogEditor,
    WithRejection(multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<Json<IdResponse>, ApiError> {
    let form = MultipartForm::read(multipart, state.max_file_size).await?;
    let (input, image) = ToppingForm::parse(form)?;

    let id = service(&state).create(&editor.actor(), input, image).await?;
    Ok(Json(IdResponse { id }))
}

/// PUT `/toppings/{id}`
async fn update_topping(
    State(state): State<AppState>,
    editor: CatalogEditor,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<Json<IdResponse>, ApiError> {
    let form = MultipartForm::read(multipart, state.max_file_size).await?;
    let (input, image) = ToppingForm::parse(form)?;

    let id = service(&state)
        .update(&editor.actor(), id, input, image)
        .await?;
    Ok(Json(IdResponse { id }))
}

/// GET `/toppings`
async fn list_toppings(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ToppingListQuery>, ApiError>,
) -> Result<Json<PageResponse<ToppingView>>, ApiError> {
    let filter = ToppingFilter {
        tenant_id: query.tenant_id.filter(|t| !t.is_empty()),
        is_published: published_filter(query.is_published.as_deref()),
    };
    let page = PageRequest::new(query.page, query.limit);

    Ok(Json(service(&state).list(&filter, page).await?))
}

/// GET `/toppings/{id}`
async fn get_topping(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<ToppingView>, ApiError> {
    Ok(Json(service(&state).get(id).await?))
}
