//! Product repository for database operations.

use chrono::Utc;
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use catalog_core::catalog::CatalogError;
use catalog_core::product::{
    NewProduct, Product, ProductFilter, ProductRepository as ProductRepoTrait,
};
use catalog_shared::types::PageRequest;

use super::contains_pattern;
use crate::entities::products;

/// Product repository implementation.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ProductRepoTrait for ProductRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, CatalogError> {
        let model = products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CatalogError::repository(e.to_string()))?;

        model.map(to_domain).transpose()
    }

    async fn create(&self, input: NewProduct) -> Result<Product, CatalogError> {
        let now = Utc::now();
        let active_model = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(input.tenant_id),
            category_id: Set(input.category_id),
            name: Set(input.name),
            description: Set(input.description),
            price_configuration: Set(price_configuration_json(&input.price_configuration)?),
            attributes: Set(input.attributes),
            image: Set(input.image),
            is_published: Set(input.is_published),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| CatalogError::repository(e.to_string()))?;

        to_domain(model)
    }

    async fn update(&self, id: Uuid, input: NewProduct) -> Result<Product, CatalogError> {
        let existing = products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CatalogError::repository(e.to_string()))?
            .ok_or_else(|| CatalogError::not_found("product", id))?;

        let mut active_model = existing.into_active_model();
        active_model.tenant_id = Set(input.tenant_id);
        active_model.category_id = Set(input.category_id);
        active_model.name = Set(input.name);
        active_model.description = Set(input.description);
        active_model.price_configuration =
            Set(price_configuration_json(&input.price_configuration)?);
        active_model.attributes = Set(input.attributes);
        active_model.image = Set(input.image);
        active_model.is_published = Set(input.is_published);
        active_model.updated_at = Set(Utc::now().into());

        let model = active_model
            .update(&self.db)
            .await
            .map_err(|e| CatalogError::repository(e.to_string()))?;

        to_domain(model)
    }

    async fn find_paginated(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, u64), CatalogError> {
        let mut query = products::Entity::find();

        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            query = query.filter(
                Expr::col((products::Entity, products::Column::Name)).ilike(contains_pattern(q)),
            );
        }
        if let Some(tenant_id) = &filter.tenant_id {
            query = query.filter(products::Column::TenantId.eq(tenant_id.as_str()));
        }
        if let Some(category_id) = &filter.category_id {
            query = query.filter(products::Column::CategoryId.eq(category_id.as_str()));
        }
        if let Some(is_published) = filter.is_published {
            query = query.filter(products::Column::IsPublished.eq(is_published));
        }

        let paginator = query
            .order_by_desc(products::Column::CreatedAt)
            .order_by_asc(products::Column::Id)
            .paginate(&self.db, page.limit);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| CatalogError::repository(e.to_string()))?;
        let models = paginator
            .fetch_page(page.page_index())
            .await
            .map_err(|e| CatalogError::repository(e.to_string()))?;

        let products = models
            .into_iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((products, total))
    }
}

fn price_configuration_json(
    config: &catalog_core::product::PriceConfiguration,
) -> Result<serde_json::Value, CatalogError> {
    serde_json::to_value(config).map_err(|e| CatalogError::repository(e.to_string()))
}

/// Convert database model to domain model.
fn to_domain(model: products::Model) -> Result<Product, CatalogError> {
    let price_configuration = serde_json::from_value(model.price_configuration).map_err(|e| {
        CatalogError::repository(format!(
            "product {} has a malformed price configuration: {e}",
            model.id
        ))
    })?;

    Ok(Product {
        id: model.id,
        tenant_id: model.tenant_id,
        category_id: model.category_id,
        name: model.name,
        description: model.description,
        price_configuration,
        attributes: model.attributes,
        image: model.image,
        is_published: model.is_published,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn model(price_configuration: serde_json::Value) -> products::Model {
        let now = Utc::now();
        products::Model {
            id: Uuid::new_v4(),
            tenant_id: "1".into(),
            category_id: "2".into(),
            name: "Pizza".into(),
            description: "Hot".into(),
            price_configuration,
            attributes: serde_json::json!([]),
            image: "file".into(),
            is_published: true,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn test_to_domain_decodes_price_configuration() {
        let product = to_domain(model(serde_json::json!({
            "Size": {"priceType": "base", "availableOptions": {"Small": "400"}}
        })))
        .unwrap();

        assert_eq!(
            product.price_configuration["Size"].available_options["Small"],
            dec!(400)
        );
    }

    #[test]
    fn test_to_domain_rejects_malformed_configuration() {
        let err = to_domain(model(serde_json::json!({"Size": 3}))).unwrap_err();
        assert!(matches!(err, CatalogError::Repository(_)));
    }
}
