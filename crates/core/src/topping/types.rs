//! Topping types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::catalog::CatalogError;

/// Stored topping.
#[derive(Debug, Clone, PartialEq)]
pub struct Topping {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: String,
    /// Display name.
    pub name: String,
    /// Flat price.
    pub price: Decimal,
    /// Filename of the image in the active storage backend.
    pub image: String,
    /// Whether customers can see the topping.
    pub is_published: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validated topping fields from a create or update request.
#[derive(Debug, Clone, PartialEq)]
pub struct ToppingInput {
    /// Owning tenant.
    pub tenant_id: String,
    /// Display name.
    pub name: String,
    /// Flat price.
    pub price: Decimal,
    /// Whether customers can see the topping.
    pub is_published: bool,
}

impl ToppingInput {
    /// Parses the price form field.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` if the text is not a decimal
    /// number or is negative.
    pub fn parse_price(raw: &str) -> Result<Decimal, CatalogError> {
        let price = Decimal::from_str(raw.trim())
            .map_err(|_| CatalogError::validation("Price must be a number"))?;

        if price.is_sign_negative() {
            return Err(CatalogError::validation("Price cannot be negative"));
        }
        Ok(price)
    }

    /// Attaches the stored image filename, producing a repository record.
    #[must_use]
    pub fn with_image(self, image: String) -> NewTopping {
        NewTopping {
            tenant_id: self.tenant_id,
            name: self.name,
            price: self.price,
            image,
            is_published: self.is_published,
        }
    }
}

/// Input for creating or replacing a topping record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTopping {
    /// Owning tenant.
    pub tenant_id: String,
    /// Display name.
    pub name: String,
    /// Flat price.
    pub price: Decimal,
    /// Image filename.
    pub image: String,
    /// Whether customers can see the topping.
    pub is_published: bool,
}

/// List filters. `None` means "don't filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToppingFilter {
    /// Owning tenant.
    pub tenant_id: Option<String>,
    /// Published flag.
    pub is_published: Option<bool>,
}

/// Topping as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToppingView {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: String,
    /// Display name.
    pub name: String,
    /// Flat price.
    pub price: Decimal,
    /// Public image URL.
    pub image: String,
    /// Whether customers can see the topping.
    pub is_published: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ToppingView {
    /// Builds the client view from a stored topping and its image URL.
    #[must_use]
    pub fn new(topping: Topping, image_url: String) -> Self {
        Self {
            id: topping.id,
            tenant_id: topping.tenant_id,
            name: topping.name,
            price: topping.price,
            image: image_url,
            is_published: topping.is_published,
            created_at: topping.created_at,
            updated_at: topping.updated_at,
        }
    }
}
