//! Entity re-exports.

pub use super::products::Entity as Products;
pub use super::toppings::Entity as Toppings;
