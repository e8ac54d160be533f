//! Topping service implementation.

use std::sync::Arc;

use catalog_shared::types::{PageRequest, PageResponse};
use tracing::info;
use uuid::Uuid;

use super::types::{NewTopping, Topping, ToppingFilter, ToppingInput, ToppingView};
use crate::catalog::{Actor, CatalogError, ImageStore, ImageUpload};
use crate::storage::FileStorage;

/// Repository trait for topping persistence.
pub trait ToppingRepository: Send + Sync {
    /// Find topping by ID.
    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Topping>, CatalogError>> + Send;

    /// Create a new topping record.
    fn create(
        &self,
        input: NewTopping,
    ) -> impl std::future::Future<Output = Result<Topping, CatalogError>> + Send;

    /// Replace the fields of an existing topping.
    fn update(
        &self,
        id: Uuid,
        input: NewTopping,
    ) -> impl std::future::Future<Output = Result<Topping, CatalogError>> + Send;

    /// One page of toppings matching `filter`, plus the total match count.
    fn find_paginated(
        &self,
        filter: &ToppingFilter,
        page: PageRequest,
    ) -> impl std::future::Future<Output = Result<(Vec<Topping>, u64), CatalogError>> + Send;
}

/// Topping service.
pub struct ToppingService<R: ToppingRepository> {
    images: ImageStore,
    repo: Arc<R>,
}

impl<R: ToppingRepository> ToppingService<R> {
    /// Create a new topping service.
    #[must_use]
    pub fn new(storage: Arc<dyn FileStorage>, repo: Arc<R>) -> Self {
        Self {
            images: ImageStore::new(storage),
            repo,
        }
    }

    /// Create a topping with its image.
    ///
    /// # Errors
    ///
    /// Returns a validation error without an image, `Forbidden` for a foreign
    /// tenant, and upload or repository errors from the backends.
    pub async fn create(
        &self,
        actor: &Actor,
        input: ToppingInput,
        image: Option<ImageUpload>,
    ) -> Result<Uuid, CatalogError> {
        let image = image.ok_or_else(|| CatalogError::validation("Please provide an image file"))?;
        actor.ensure_can_manage(&input.tenant_id)?;

        let topping = self
            .images
            .store_with(image, |filename| self.repo.create(input.with_image(filename)))
            .await?;

        info!(
            topping_id = %topping.id,
            tenant_id = %topping.tenant_id,
            user_id = %actor.user_id,
            filename = %topping.image,
            "Topping created"
        );
        Ok(topping.id)
    }

    /// Update a topping, optionally replacing its image.
    ///
    /// # Errors
    ///
    /// Same as [`ProductService::update`](crate::product::ProductService::update).
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        input: ToppingInput,
        image: Option<ImageUpload>,
    ) -> Result<Uuid, CatalogError> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("topping", id))?;

        actor.ensure_can_manage(&existing.tenant_id)?;
        if input.tenant_id != existing.tenant_id {
            actor.ensure_can_manage(&input.tenant_id)?;
        }

        let image_replaced = image.is_some();
        let topping = self
            .images
            .replace_with(&existing.image, image, |filename| {
                self.repo.update(id, input.with_image(filename))
            })
            .await?;

        info!(
            topping_id = %topping.id,
            user_id = %actor.user_id,
            image_replaced,
            "Topping updated"
        );
        Ok(topping.id)
    }

    /// Get one topping with its image URL.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the topping does not exist.
    pub async fn get(&self, id: Uuid) -> Result<ToppingView, CatalogError> {
        let topping = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("topping", id))?;

        self.to_view(topping)
    }

    /// List toppings matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or an image URL cannot be resolved.
    pub async fn list(
        &self,
        filter: &ToppingFilter,
        page: PageRequest,
    ) -> Result<PageResponse<ToppingView>, CatalogError> {
        let (toppings, total) = self.repo.find_paginated(filter, page).await?;

        PageResponse::new(toppings, page, total).try_map(|t| self.to_view(t))
    }

    fn to_view(&self, topping: Topping) -> Result<ToppingView, CatalogError> {
        let url = self.images.resolve(&topping.image)?;
        Ok(ToppingView::new(topping, url))
    }
}
