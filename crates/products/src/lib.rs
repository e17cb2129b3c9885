//! Catalog domain: categories and products.
//!
//! Plain records plus their create/patch payloads and validation rules
//! (no IO, no HTTP, no storage).

pub mod category;
pub mod product;

pub use category::{Category, CategoryFilter, CategoryPatch, NewCategory};
pub use product::{NewProduct, Product, ProductFilter, ProductPatch};
