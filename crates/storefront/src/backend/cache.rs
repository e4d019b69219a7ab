//! Cache types for commerce API responses.

use fortynine_core::api::{Brand, Category, Product};
use fortynine_core::location::LocationDirectory;

/// Cached value types.
///
/// Only slow-changing reads are cached. Cart, order, and profile data is
/// always fetched fresh.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Brands(Vec<Brand>),
    Categories(Vec<Category>),
    Locations(LocationDirectory),
}
