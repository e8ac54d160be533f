//! Toppings: flat-priced add-ons with an image, owned by a tenant.

mod service;
mod types;

pub use service::{ToppingRepository, ToppingService};
pub use types::{NewTopping, Topping, ToppingFilter, ToppingInput, ToppingView};
