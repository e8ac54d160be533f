//! Product routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    routing::get,
};
use axum_extra::extract::WithRejection;
use catalog_core::catalog::ImageUpload;
use catalog_core::product::{ProductFilter, ProductInput, ProductService, ProductView};
use catalog_db::ProductRepository;
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

/// Creates the product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product).put(update_product))
}

fn service(state: &AppState) -> ProductService<ProductRepository> {
    ProductService::new(
        state.storage.clone(),
        Arc::new(ProductRepository::new(state.db.as_ref().clone())),
    )
}

// ============================================================================
// Request Types
// ============================================================================

/// Text fields of the product create/update form.
#[derive(Debug, Validate)]
pub struct ProductForm {
    /// Display name.
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    /// Description.
    #[validate(length(min = 1, message = "Product description is required"))]
    pub description: String,
    /// JSON-encoded price configuration.
    #[validate(length(min = 1, message = "Price configuration is required"))]
    pub price_configuration: String,
    /// JSON-encoded attributes.
    #[validate(length(min = 1, message = "Attributes are required"))]
    pub attributes: String,
    /// Owning tenant.
    #[validate(length(min = 1, message = "Tenant id is required"))]
    pub tenant_id: String,
    /// Category reference.
    #[validate(length(min = 1, message = "Category id is required"))]
    pub category_id: String,
    /// Published flag.
    pub is_published: bool,
}

impl ProductForm {
    /// Splits a multipart form into validated product input and the image.
    ///
    /// # Errors
    ///
    /// Returns a 400 `ApiError` for missing or malformed fields.
    pub fn parse(mut form: MultipartForm) -> Result<(ProductInput, Option<ImageUpload>), ApiError> {
        let fields = Self {
            name: form.text_or_empty("name").trim().to_string(),
            description: form.text_or_empty("description"),
            price_configuration: form.text_or_empty("priceConfiguration"),
            attributes: form.text_or_empty("attributes"),
            tenant_id: form.text_or_empty("tenantId").trim().to_string(),
            category_id: form.text_or_empty("categoryId").trim().to_string(),
            is_published: form.flag("isPublished")?,
        };
        fields
            .validate()
            .map_err(|e| ApiError::validation(validation_message(&e)))?;

        let input = ProductInput {
            price_configuration: ProductInput::parse_price_configuration(
                &fields.price_configuration,
            )?,
            attributes: ProductInput::parse_attributes(&fields.attributes)?,
            tenant_id: fields.tenant_id,
            category_id: fields.category_id,
            name: fields.name,
            description: fields.description,
            is_published: fields.is_published,
        };
        Ok((input, form.take_image()))
    }
}

/// Query parameters for listing products.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    /// Name search.
    pub q: Option<String>,
    /// Tenant filter.
    pub tenant_id: Option<String>,
    /// Category filter.
    pub category_id: Option<String>,
    /// `true` or `false`.
    pub is_published: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
}

impl ProductListQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            q: self.q.clone().filter(|q| !q.trim().is_empty()),
            tenant_id: self.tenant_id.clone().filter(|t| !t.is_empty()),
            category_id: self.category_id.clone().filter(|c| !c.is_empty()),
            is_published: published_filter(self.is_published.as_deref()),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/products`
async fn create_product(
    State(state): State<AppState>,
    editor: CatalogEditor,
    WithRejection(multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<Json<IdResponse>, ApiError> {
    let form = MultipartForm::read(multipart, state.max_file_size).await?;
    let (input, image) = ProductForm::parse(form)?;

    let id = service(&state).create(&editor.actor(), input, image).await?;
    Ok(Json(IdResponse { id }))
}

/// PUT `/products/{id}`
async fn update_product(
    State(state): State<AppState>,
    editor: CatalogEditor,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<Json<IdResponse>, ApiError> {
    let form = MultipartForm::read(multipart, state.max_file_size).await?;
    let (input, image) = ProductForm::parse(form)?;

    let id = service(&state)
        .update(&editor.actor(), id, input, image)
        .await?;
    Ok(Json(IdResponse { id }))
}

/// GET `/products`
async fn list_products(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ProductListQuery>, ApiError>,
) -> Result<Json<PageResponse<ProductView>>, ApiError> {
    let page = PageRequest::new(query.page, query.limit);
    let products = service(&state).list(&query.filter(), page).await?;
    Ok(Json(products))
}

/// GET `/products/{id}`
async fn get_product(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<ProductView>, ApiError> {
    Ok(Json(service(&state).get(id).await?))
}
