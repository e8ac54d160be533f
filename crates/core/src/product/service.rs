//! Product service implementation.

use std::sync::Arc;

use catalog_shared::types::{PageRequest, PageResponse};
use tracing::info;
use uuid::Uuid;

use super::types::{NewProduct, Product, ProductFilter, ProductInput, ProductView};
use crate::catalog::{Actor, CatalogError, ImageStore, ImageUpload};
use crate::storage::FileStorage;

/// Repository trait for product persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait ProductRepository: Send + Sync {
    /// Find product by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Product>, CatalogError>> + Send;

    /// Create a new product record.
    fn create(
        &self,
        input: NewProduct,
    ) -> impl std::future::Future<Output = Result<Product, CatalogError>> + Send;

    /// Replace the fields of an existing product.
    ///
    /// Returns `CatalogError::NotFound` if the row is gone.
    fn update(
        &self,
        id: Uuid,
        input: NewProduct,
    ) -> impl std::future::Future<Output = Result<Product, CatalogError>> + Send;

    /// One page of products matching `filter`, plus the total match count.
    fn find_paginated(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> impl std::future::Future<Output = Result<(Vec<Product>, u64), CatalogError>> + Send;
}

/// Product service: image handling, ownership checks and persistence.
pub struct ProductService<R: ProductRepository> {
    images: ImageStore,
    repo: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new product service.
    #[must_use]
    pub fn new(storage: Arc<dyn FileStorage>, repo: Arc<R>) -> Self {
        Self {
            images: ImageStore::new(storage),
            repo,
        }
    }

    /// Create a product with its image.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No image was provided
    /// - The actor may not manage the target tenant
    /// - The image upload fails (nothing is persisted)
    /// - The database write fails (the uploaded image is logged as orphaned)
    pub async fn create(
        &self,
        actor: &Actor,
        input: ProductInput,
        image: Option<ImageUpload>,
    ) -> Result<Uuid, CatalogError> {
        let image = image.ok_or_else(|| CatalogError::validation("Please provide an image file"))?;
        actor.ensure_can_manage(&input.tenant_id)?;

        let product = self
            .images
            .store_with(image, |filename| self.repo.create(input.with_image(filename)))
            .await?;

        info!(
            product_id = %product.id,
            tenant_id = %product.tenant_id,
            user_id = %actor.user_id,
            filename = %product.image,
            "Product created"
        );
        Ok(product.id)
    }

    /// Update a product, optionally replacing its image.
    ///
    /// Ownership is checked before anything is uploaded. With a new image the
    /// old one is deleted only after the record points at the new one.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The product does not exist
    /// - The actor may not manage the product's tenant
    /// - The image upload or the database write fails
    /// - The replaced image cannot be deleted (the record is already updated)
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: ProductInput,
        image: Option<ImageUpload>,
    ) -> Result<Uuid, CatalogError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("product", id))?;

        actor.ensure_can_manage(&existing.tenant_id)?;
        if input.tenant_id != existing.tenant_id {
            actor.ensure_can_manage(&input.tenant_id)?;
        }

        let image_replaced = image.is_some();
        let product = self
            .images
            .replace_with(&existing.image, image, |filename| {
                self.repo.update(id, input.with_image(filename))
            })
            .await?;

        info!(
            product_id = %product.id,
            user_id = %actor.user_id,
            image_replaced,
            "Product updated"
        );
        Ok(product.id)
    }

    /// Get one product with its image URL.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist, or a
    /// storage error if the image URL cannot be resolved.
    pub async fn get(&self, id: Uuid) -> Result<ProductView, CatalogError> {
        let product = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("product", id))?;

        self.to_view(product)
    }

    /// List products matching `filter`, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or an image URL cannot be resolved.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<PageResponse<ProductView>, CatalogError> {
        let (products, total) = self.repo.find_paginated(filter, page).await?;

        PageResponse::new(products, page, total).try_map(|p| self.to_view(p))
    }

    fn to_view(&self, product: Product) -> Result<ProductView, CatalogError> {
        let url = self.images.resolve(&product.image)?;
        Ok(ProductView::new(product, url))
    }
}
