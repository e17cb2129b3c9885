//! Storage boundaries used by the HTTP layer.
//!
//! Every store is object safe (`Arc<dyn …>`), so the API can be wired against
//! the in-memory implementation (tests/dev) or Postgres (production) at startup.

use async_trait::async_trait;

use storeadmin_auth::{NewRole, Role, User, UserFilter};
use storeadmin_core::{Entity, OrderId, Page, Pagination};
use storeadmin_products::{Category, CategoryFilter, Product, ProductFilter};
use storeadmin_sales::{Discount, LineItem, Order, OrderChildren, OrderFilter};

use crate::error::{StoreError, StoreResult};

pub type CategoryStore = dyn RecordStore<Category, CategoryFilter>;
pub type ProductStore = dyn RecordStore<Product, ProductFilter>;
pub type UserStore = dyn RecordStore<User, UserFilter>;

/// Basic persistence for one record type `T`, listed through filter `F`.
#[async_trait]
pub trait RecordStore<T, F>: Send + Sync
where
    T: Entity + Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    /// One page of records matching `filter`, oldest first.
    async fn list(&self, filter: &F, pagination: Pagination) -> StoreResult<Page<T>>;

    async fn find(&self, id: T::Id) -> StoreResult<Option<T>>;

    async fn insert(&self, record: &T) -> StoreResult<()>;

    /// Overwrite the stored row with `record`. Fails with `NotFound` for unknown ids.
    async fn update(&self, record: &T) -> StoreResult<()>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: T::Id) -> StoreResult<bool>;

    /// Like [`RecordStore::find`], but a missing record is an error.
    async fn find_or_fail(&self, id: T::Id) -> StoreResult<T> {
        self.find(id)
            .await?
            .ok_or(StoreError::NotFound(T::NAME))
    }
}

/// Role lookups and bootstrap inserts.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Role>>;

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Role>>;

    async fn create(&self, role: NewRole) -> StoreResult<Role>;
}

/// Orders plus their owned children.
///
/// Deleting an order deletes its line items and discounts.
#[async_trait]
pub trait OrderStore:
    RecordStore<Order, OrderFilter> + OrderChildren<Error = StoreError>
{
    async fn insert_line_item(&self, item: &LineItem) -> StoreResult<()>;

    async fn insert_discount(&self, discount: &Discount) -> StoreResult<()>;

    async fn line_items(&self, order_id: OrderId) -> StoreResult<Vec<LineItem>>;

    async fn discounts(&self, order_id: OrderId) -> StoreResult<Vec<Discount>>;
}
