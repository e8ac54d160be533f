//! Topping repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use catalog_core::catalog::CatalogError;
use catalog_core::topping::{
    NewTopping, Topping, ToppingFilter, ToppingRepository as ToppingRepoTrait,
};
use catalog_shared::types::PageRequest;

use crate::entities::toppings;

/// Topping repository implementation.
#[derive(Debug, Clone)]
pub struct ToppingRepository {
    db: DatabaseConnection,
}

impl ToppingRepository {
    /// Create a new topping repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ToppingRepoTrait for ToppingRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Topping>, CatalogError> {
        let model = toppings::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CatalogError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn create(&self, input: NewTopping) -> Result<Topping, CatalogError> {
        let now = Utc::now();
        let active_model = toppings::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(input.tenant_id),
            name: Set(input.name),
            price: Set(input.price),
            image: Set(input.image),
            is_published: Set(input.is_published),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| CatalogError::repository(e.to_string()))?;

        Ok(to_domain(model))
    }

    async fn update(&self, id: Uuid, input: NewTopping) -> Result<Topping, CatalogError> {
        let existing = toppings::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CatalogError::repository(e.to_string()))?
            .ok_or_else(|| CatalogError::not_found("topping", id))?;

        let mut active_model = existing.into_active_model();
        active_model.tenant_id = Set(input.tenant_id);
        active_model.name = Set(input.name);
        active_model.price = Set(input.price);
        active_model.image = Set(input.image);
        active_model.is_published = Set(input.is_published);
        active_model.updated_at = Set(Utc::now().into());

        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| CatalogError::repository(e.to_string()))?;

        Ok(to_domain(model))
    }

    async fn find_paginated(
        &self,
        filter: &ToppingFilter,
        page: PageRequest,
    ) -> Result<(Vec<Topping>, u64), CatalogError> {
        let mut query = toppings::Entity::find();

        if let Some(tenant_id) = &filter.tenant_id {
            query = query.filter(toppings::Column::TenantId.eq(tenant_id.as_str()));
        }
        if let Some(is_published) = filter.is_published {
            query = query.filter(toppings::Column::IsPublished.eq(is_published));
        }

        let paginator = query
            .order_by_desc(toppings::Column::CreatedAt)
            .order_by_asc(toppings::Column::Id)
            .paginate(&self.db, page.limit);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| CatalogError::repository(e.to_string()))?;
        let models = paginator
            .fetch_page(page.page_index())
            .await
            .map_err(|e| CatalogError::repository(e.to_string()))?;

        Ok((models.into_iter().map(to_domain).collect(), total))
    }
}

/// Convert database model to domain model.
fn to_domain(model: toppings::Model) -> Topping {
    Topping {
        id: model.id,
        tenant_id: model.tenant_id,
        name: model.name,
        price: model.price,
        image: model.image,
        is_published: model.is_published,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
