//! `SeaORM` entity definitions.

pub mod prelude;

pub mod products;
pub mod toppings;
