//! Products: priced menu items with an image, owned by a tenant.

mod service;
mod types;

pub use service::{ProductRepository, ProductService};
pub use types::{
    NewProduct, PriceConfigEntry, PriceConfiguration, PriceType, Product, ProductFilter,
    ProductInput, ProductView,
};
