//! Request authentication.

pub mod auth;

pub use auth::{AuthUser, CatalogEditor};
