//! Repository implementations for the catalog traits in `catalog-core`.

mod product;
mod topping;

pub use product::ProductRepository;
pub use topping::ToppingRepository;

/// Builds an `ILIKE` pattern matching `term` anywhere, with the wildcard
/// characters in `term` matched literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
