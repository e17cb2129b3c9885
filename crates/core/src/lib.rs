//! `storeadmin-core`: shared building blocks for the admin backend.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod pagination;
pub mod patch;

pub use entity::{Entity, Filter};
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, DiscountId, ImageId, LineItemId, OrderId, ProductId, RoleId, UserId};
pub use pagination::{Page, Pagination};
pub use patch::Patch;
