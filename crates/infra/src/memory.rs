//! In-memory store for tests/dev.
//!
//! One `InMemoryStore` backs every store trait. Rows live in ordered maps keyed by
//! their time-ordered ids, so listings come back oldest first just like the
//! Postgres implementation (`ORDER BY id`).

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use storeadmin_auth::{NewRole, Role, User, UserFilter};
use storeadmin_core::{Entity, Filter, OrderId, Page, Pagination, RoleId};
use storeadmin_products::{Category, CategoryFilter, Product, ProductFilter};
use storeadmin_sales::{
    Discount, DiscountField, LineItem, LineItemField, Order, OrderChildren, OrderFilter,
};

use crate::error::{StoreError, StoreResult};
use crate::store::{OrderStore, RecordStore, RoleStore};

/// Sum that fails like Postgres' `SUM(...)::BIGINT` instead of overflowing.
fn checked_sum(mut values: impl Iterator<Item = i64>, what: &str) -> StoreResult<i64> {
    values
        .try_fold(0i64, |acc, v| acc.checked_add(v))
        .ok_or_else(|| StoreError::Storage(format!("sum of {what} is out of range")))
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct Table<T: Entity> {
    rows: RwLock<BTreeMap<T::Id, T>>,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Entity + Clone> Table<T> {
    fn list(&self, filter: &impl Filter<T>, pagination: Pagination) -> Page<T> {
        let rows = read(&self.rows)
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        pagination.slice(rows)
    }

    fn find(&self, id: T::Id) -> Option<T> {
        read(&self.rows).get(&id).cloned()
    }

    fn any(&self, pred: impl Fn(&T) -> bool) -> bool {
        read(&self.rows).values().any(pred)
    }

    fn insert(&self, record: T) -> StoreResult<()> {
        let mut rows = write(&self.rows);
        let id = record.id();
        if rows.contains_key(&id) {
            return Err(StoreError::Conflict(format!("{} {} already exists", T::NAME, id)));
        }
        rows.insert(id, record);
        Ok(())
    }

    fn update(&self, record: T) -> StoreResult<()> {
        let mut rows = write(&self.rows);
        match rows.get_mut(&record.id()) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StoreError::NotFound(T::NAME)),
        }
    }

    fn delete(&self, id: T::Id) -> bool {
        write(&self.rows).remove(&id).is_some()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    categories: Table<Category>,
    products: Table<Product>,
    users: Table<User>,
    orders: Table<Order>,
    roles: RwLock<Vec<Role>>,
    line_items: RwLock<Vec<LineItem>>,
    discounts: RwLock<Vec<Discount>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(&self, user: &User) -> bool {
        self.users
            .any(|other| other.id != user.id && other.email == user.email)
    }
}

macro_rules! plain_record_store {
    ($record:ty, $filter:ty, $table:ident) => {
        #[async_trait]
        impl RecordStore<$record, $filter> for InMemoryStore {
            async fn list(&self, filter: &$filter, pagination: Pagination) -> StoreResult<Page<$record>> {
                Ok(self.$table.list(filter, pagination))
            }

            async fn find(&self, id: <$record as Entity>::Id) -> StoreResult<Option<$record>> {
                Ok(self.$table.find(id))
            }

            async fn insert(&self, record: &$record) -> StoreResult<()> {
                self.$table.insert(record.clone())
            }

            async fn update(&self, record: &$record) -> StoreResult<()> {
                self.$table.update(record.clone())
            }

            async fn delete(&self, id: <$record as Entity>::Id) -> StoreResult<bool> {
                Ok(self.$table.delete(id))
            }
        }
    };
}

plain_record_store!(Category, CategoryFilter, categories);
plain_record_store!(Product, ProductFilter, products);

#[async_trait]
impl RecordStore<User, UserFilter> for InMemoryStore {
    async fn list(&self, filter: &UserFilter, pagination: Pagination) -> StoreResult<Page<User>> {
        Ok(self.users.list(filter, pagination))
    }

    async fn find(&self, id: storeadmin_core::UserId) -> StoreResult<Option<User>> {
        Ok(self.users.find(id))
    }

    async fn insert(&self, record: &User) -> StoreResult<()> {
        if self.email_taken(record) {
            return Err(StoreError::Conflict(format!("email {} is already registered", record.email)));
        }
        self.users.insert(record.clone())
    }

    async fn update(&self, record: &User) -> StoreResult<()> {
        if self.email_taken(record) {
            return Err(StoreError::Conflict(format!("email {} is already registered", record.email)));
        }
        self.users.update(record.clone())
    }

    async fn delete(&self, id: storeadmin_core::UserId) -> StoreResult<bool> {
        Ok(self.users.delete(id))
    }
}

/// Drop the side-channel fields; they are never persisted.
fn stored_order(order: &Order) -> Order {
    Order {
        subtotal: 0,
        discount_total: 0,
        ..order.clone()
    }
}

#[async_trait]
impl RecordStore<Order, OrderFilter> for InMemoryStore {
    async fn list(&self, filter: &OrderFilter, pagination: Pagination) -> StoreResult<Page<Order>> {
        Ok(self.orders.list(filter, pagination))
    }

    async fn find(&self, id: OrderId) -> StoreResult<Option<Order>> {
        Ok(self.orders.find(id))
    }

    async fn insert(&self, record: &Order) -> StoreResult<()> {
        self.orders.insert(stored_order(record))
    }

    async fn update(&self, record: &Order) -> StoreResult<()> {
        self.orders.update(stored_order(record))
    }

    async fn delete(&self, id: OrderId) -> StoreResult<bool> {
        let deleted = self.orders.delete(id);
        if deleted {
            write(&self.line_items).retain(|item| item.order_id != id);
            write(&self.discounts).retain(|d| d.order_id != id);
        }
        Ok(deleted)
    }
}

#[async_trait]
impl OrderChildren for InMemoryStore {
    type Error = StoreError;

    async fn sum_line_items(&self, order_id: OrderId, field: LineItemField) -> StoreResult<i64> {
        let items = read(&self.line_items);
        let values = items
            .iter()
            .filter(|item| item.order_id == order_id)
            .map(|item| match field {
                LineItemField::Subtotal => item.subtotal,
                LineItemField::Quantity => item.quantity,
            });
        checked_sum(values, field.column())
    }

    async fn sum_discounts(&self, order_id: OrderId, field: DiscountField) -> StoreResult<i64> {
        let discounts = read(&self.discounts);
        let values = discounts
            .iter()
            .filter(|d| d.order_id == order_id)
            .map(|d| match field {
                DiscountField::Discount => d.discount,
            });
        checked_sum(values, field.column())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_line_item(&self, item: &LineItem) -> StoreResult<()> {
        if self.orders.find(item.order_id).is_none() {
            return Err(StoreError::NotFound(Order::NAME));
        }
        write(&self.line_items).push(item.clone());
        Ok(())
    }

    async fn insert_discount(&self, discount: &Discount) -> StoreResult<()> {
        if self.orders.find(discount.order_id).is_none() {
            return Err(StoreError::NotFound(Order::NAME));
        }
        write(&self.discounts).push(discount.clone());
        Ok(())
    }

    async fn line_items(&self, order_id: OrderId) -> StoreResult<Vec<LineItem>> {
        Ok(read(&self.line_items)
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn discounts(&self, order_id: OrderId) -> StoreResult<Vec<Discount>> {
        Ok(read(&self.discounts)
            .iter()
            .filter(|d| d.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RoleStore for InMemoryStore {
    async fn list(&self) -> StoreResult<Vec<Role>> {
        Ok(read(&self.roles).clone())
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Role>> {
        Ok(read(&self.roles).iter().find(|r| r.slug == slug).cloned())
    }

    async fn create(&self, role: NewRole) -> StoreResult<Role> {
        let role = role.into_role(RoleId::new())?;
        let mut roles = write(&self.roles);
        if roles.iter().any(|r| r.slug == role.slug) {
            return Err(StoreError::Conflict(format!("role '{}' already exists", role.slug)));
        }
        roles.push(role.clone());
        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use storeadmin_auth::NewUser;
    use storeadmin_core::{LineItemId, ProductId, UserId};
    use storeadmin_products::NewCategory;
    use storeadmin_sales::recompute;

    use super::*;
    use crate::store::{CategoryStore, UserStore};

    fn category(title: &str) -> Category {
        NewCategory {
            title: title.to_string(),
            description: None,
            image_id: None,
        }
        .into_category(storeadmin_core::CategoryId::new(), Utc::now())
        .unwrap()
    }

    fn user(email: &str) -> User {
        NewUser {
            name: "Ana".to_string(),
            surname: "Lima".to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            image_id: None,
        }
        .into_user(UserId::new(), Utc::now())
        .unwrap()
    }

    #[tokio::test]
    async fn categories_are_filtered_and_paginated() {
        let store = Arc::new(InMemoryStore::new());
        let categories: Arc<CategoryStore> = store;
        for title in ["Shoes", "Shirts", "Hats", "Shorts"] {
            categories.insert(&category(title)).await.unwrap();
        }

        let filter = CategoryFilter {
            title: Some("sh".to_string()),
        };
        let page = categories
            .list(&filter, Pagination::new(Some(1), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.last_page, 2);
        let titles: Vec<_> = page.data.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Shoes", "Shirts"]);
    }

    #[tokio::test]
    async fn update_of_unknown_record_is_not_found() {
        let categories: Arc<CategoryStore> = Arc::new(InMemoryStore::new());
        let err = categories.update(&category("Ghost")).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("category"));
    }

    #[tokio::test]
    async fn find_or_fail_reports_missing_records() {
        let categories: Arc<CategoryStore> = Arc::new(InMemoryStore::new());
        let err = categories
            .find_or_fail(storeadmin_core::CategoryId::new())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("category"));
    }

    #[tokio::test]
    async fn duplicate_user_email_is_a_conflict() {
        let users: Arc<UserStore> = Arc::new(InMemoryStore::new());
        users.insert(&user("ana@example.com")).await.unwrap();
        let err = users.insert(&user("ana@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_an_order_cascades_to_children() {
        let store = InMemoryStore::new();
        let order = Order::new(OrderId::new(), None, Utc::now());
        RecordStore::<Order, OrderFilter>::insert(&store, &order).await.unwrap();
        store
            .insert_line_item(&LineItem {
                id: LineItemId::new(),
                order_id: order.id,
                product_id: ProductId::new(),
                quantity: 2,
                subtotal: 10,
            })
            .await
            .unwrap();

        assert!(RecordStore::<Order, OrderFilter>::delete(&store, order.id).await.unwrap());
        assert!(store.line_items(order.id).await.unwrap().is_empty());
        assert_eq!(
            store.sum_line_items(order.id, LineItemField::Quantity).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn children_of_unknown_order_are_rejected() {
        let store = InMemoryStore::new();
        let err = store
            .insert_discount(&Discount {
                id: storeadmin_core::DiscountId::new(),
                order_id: OrderId::new(),
                discount: 5,
            })
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("order"));
    }

    #[tokio::test]
    async fn side_channel_totals_are_not_persisted() {
        let store = InMemoryStore::new();
        let mut order = Order::new(OrderId::new(), None, Utc::now());
        RecordStore::<Order, OrderFilter>::insert(&store, &order).await.unwrap();
        store
            .insert_discount(&Discount {
                id: storeadmin_core::DiscountId::new(),
                order_id: order.id,
                discount: 4,
            })
            .await
            .unwrap();

        recompute(&store, &mut order).await.unwrap();
        assert_eq!(order.discount_total, 4);
        assert_eq!(order.total, -4);
        RecordStore::<Order, OrderFilter>::update(&store, &order).await.unwrap();

        let stored = RecordStore::<Order, OrderFilter>::find(&store, order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total, -4);
        assert_eq!(stored.discount_total, 0);
    }

    #[tokio::test]
    async fn overflowing_sums_are_storage_errors() {
        let store = InMemoryStore::new();
        let mut order = Order::new(OrderId::new(), None, Utc::now());
        RecordStore::<Order, OrderFilter>::insert(&store, &order).await.unwrap();
        for _ in 0..2 {
            store
                .insert_line_item(&LineItem {
                    id: LineItemId::new(),
                    order_id: order.id,
                    product_id: ProductId::new(),
                    quantity: 1,
                    subtotal: i64::MAX - 1,
                })
                .await
                .unwrap();
        }

        let before = order.clone();
        let err = recompute(&store, &mut order).await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        assert_eq!(order, before);
        assert_eq!(
            store.sum_line_items(order.id, LineItemField::Quantity).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn role_slugs_are_unique() {
        let store = InMemoryStore::new();
        store.create(NewRole::new("Admin", "admin", "x")).await.unwrap();
        let err = store.create(NewRole::new("Admin 2", "admin", "y")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(store.find_by_slug("admin").await.unwrap().is_some());
    }
}
