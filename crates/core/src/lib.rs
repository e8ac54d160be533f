//! Core business logic for the catalog service.
//!
//! This crate holds the domain types, ownership rules and orchestration of
//! products and toppings, plus the pluggable image storage they depend on.
//! It has no web or database dependencies.
//!
//! # Modules
//!
//! - `storage` - `FileStorage` trait and its S3, Cloudinary and local backends
//! - `catalog` - actors, image handling and the shared error type
//! - `product` - products with configurable pricing
//! - `topping` - flat-priced toppings

pub mod catalog;
pub mod product;
pub mod storage;
pub mod topping;

#[cfg(test)]
mod testing;
