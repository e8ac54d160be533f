//! Product types and data structures.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::CatalogError;

/// How an option's price combines with the rest of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    /// Price of the option replaces the base price (e.g. size).
    Base,
    /// Price of the option is added on top (e.g. crust).
    Additional,
}

/// Pricing for one configurable dimension, keyed by option name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceConfigEntry {
    /// How prices combine.
    pub price_type: PriceType,
    /// Option name to price.
    pub available_options: BTreeMap<String, Decimal>,
}

/// Dimension name (e.g. "Size") to its pricing.
pub type PriceConfiguration = BTreeMap<String, PriceConfigEntry>;

/// Stored product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: String,
    /// Category reference.
    pub category_id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Pricing per configurable dimension.
    pub price_configuration: PriceConfiguration,
    /// Free-form attributes.
    pub attributes: serde_json::Value,
    /// Filename of the image in the active storage backend.
    pub image: String,
    /// Whether customers can see the product.
    pub is_published: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validated product fields from a create or update request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    /// Owning tenant.
    pub tenant_id: String,
    /// Category reference.
    pub category_id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Pricing per configurable dimension.
    pub price_configuration: PriceConfiguration,
    /// Free-form attributes.
    pub attributes: serde_json::Value,
    /// Whether customers can see the product.
    pub is_published: bool,
}

impl ProductInput {
    /// Parses the JSON-encoded price configuration form field.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the text is not a valid
    /// configuration object.
    pub fn parse_price_configuration(raw: &str) -> Result<PriceConfiguration, CatalogError> {
        serde_json::from_str(raw)
            .map_err(|e| CatalogError::validation(format!("Invalid price configuration: {e}")))
    }

    /// Parses the JSON-encoded attributes form field.
    ///
    /// Attributes must be a JSON object or array.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` otherwise.
    pub fn parse_attributes(raw: &str) -> Result<serde_json::Value, CatalogError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| CatalogError::validation(format!("Invalid attributes: {e}")))?;

        if value.is_object() || value.is_array() {
            Ok(value)
        } else {
            Err(CatalogError::validation(
                "Invalid attributes: expected a JSON object or array",
            ))
        }
    }

    /// Attaches the stored image filename, producing a repository record.
    #[must_use]
    pub fn with_image(self, image: String) -> NewProduct {
        NewProduct {
            tenant_id: self.tenant_id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            price_configuration: self.price_configuration,
            attributes: self.attributes,
            image,
            is_published: self.is_published,
        }
    }
}

/// Input for creating or replacing a product record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    /// Owning tenant.
    pub tenant_id: String,
    /// Category reference.
    pub category_id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Pricing per configurable dimension.
    pub price_configuration: PriceConfiguration,
    /// Free-form attributes.
    pub attributes: serde_json::Value,
    /// Image filename.
    pub image: String,
    /// Whether customers can see the product.
    pub is_published: bool,
}

/// List filters. `None` means "don't filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive name search.
    pub q: Option<String>,
    /// Owning tenant.
    pub tenant_id: Option<String>,
    /// Category.
    pub category_id: Option<String>,
    /// Published flag; `Some(true)` matches only published products.
    pub is_published: Option<bool>,
}

/// Product as returned to clients, with the image resolved to a URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: String,
    /// Category reference.
    pub category_id: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Pricing per configurable dimension.
    pub price_configuration: PriceConfiguration,
    /// Free-form attributes.
    pub attributes: serde_json::Value,
    /// Public image URL.
    pub image: String,
    /// Whether customers can see the product.
    pub is_published: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ProductView {
    /// Builds the client view from a stored product and its image URL.
    #[must_use]
    pub fn new(product: Product, image_url: String) -> Self {
        Self {
            id: product.id,
            tenant_id: product.tenant_id,
            category_id: product.category_id,
            name: product.name,
            description: product.description,
            price_configuration: product.price_configuration,
            attributes: product.attributes,
            image: image_url,
            is_published: product.is_published,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_empty_price_configuration() {
        let config = ProductInput::parse_price_configuration("{}").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_parse_price_configuration() {
        let raw = r#"{
            "Size": {"priceType": "base", "availableOptions": {"Small": 400, "Large": "650.50"}},
            "Crust": {"priceType": "additional", "availableOptions": {"Thin": 0}}
        }"#;

        let config = ProductInput::parse_price_configuration(raw).unwrap();
        let size = &config["Size"];
        assert_eq!(size.price_type, PriceType::Base);
        assert_eq!(size.available_options["Small"], dec!(400));
        assert_eq!(size.available_options["Large"], dec!(650.50));
        assert_eq!(config["Crust"].price_type, PriceType::Additional);
    }

    #[test]
    fn test_parse_price_configuration_rejects_garbage() {
        let err = ProductInput::parse_price_configuration("{not json").unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        let raw = r#"{"Size": {"priceType": "weird", "availableOptions": {}}}"#;
        let err = ProductInput::parse_price_configuration(raw).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn test_parse_attributes() {
        assert!(ProductInput::parse_attributes("{}").unwrap().is_object());
        assert!(
            ProductInput::parse_attributes(r#"[{"name": "isHot", "value": "yes"}]"#)
                .unwrap()
                .is_array()
        );
        assert!(ProductInput::parse_attributes("42").is_err());
        assert!(ProductInput::parse_attributes("").is_err());
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let now = Utc::now();
        let product = Product {
            id: Uuid::nil(),
            tenant_id: "1".into(),
            category_id: "2".into(),
            name: "Pizza".into(),
            description: "Cheesy".into(),
            price_configuration: PriceConfiguration::new(),
            attributes: serde_json::json!({}),
            image: "file".into(),
            is_published: true,
            created_at: now,
            updated_at: now,
        };

        let view = ProductView::new(product, "https://cdn/file".into());
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["tenantId"], "1");
        assert_eq!(json["categoryId"], "2");
        assert_eq!(json["isPublished"], true);
        assert_eq!(json["image"], "https://cdn/file");
        assert!(json.get("priceConfiguration").is_some());
    }
}
