//! Pieces shared by the product and topping flows.
//!
//! - `access` - who may edit which tenant's entries
//! - `image` - upload, swap and URL resolution of entity images
//! - `error` - the error type every catalog service returns

mod access;
mod error;
mod image;

pub use access::Actor;
pub use error::CatalogError;
pub use image::{ImageStore, ImageUpload, NOT_AN_IMAGE};
