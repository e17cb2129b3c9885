use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;
use uuid::Uuid;

use storeadmin_core::{DiscountId, LineItemId, OrderId, Page, Pagination, ProductId, UserId};
use storeadmin_sales::{
    Discount, DiscountField, LineItem, LineItemField, Order, OrderChildren, OrderFilter,
    OrderStatus,
};

use super::{PostgresStore, count_to_total, limit_offset};
use crate::error::{StoreError, StoreResult, map_sqlx_error};
use crate::store::{OrderStore, RecordStore};

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Option<Uuid>,
    status: String,
    total: i64,
    qty_items: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e| StoreError::Storage(format!("corrupt order row {}: {e}", row.id)))?;
        Ok(Order {
            id: OrderId::from_uuid(row.id),
            user_id: row.user_id.map(UserId::from_uuid),
            status,
            total: row.total,
            qty_items: row.qty_items,
            subtotal: 0,
            discount_total: 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct LineItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    subtotal: i64,
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        LineItem {
            id: LineItemId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            product_id: ProductId::from_uuid(row.product_id),
            quantity: row.quantity,
            subtotal: row.subtotal,
        }
    }
}

#[derive(Debug, FromRow)]
struct DiscountRow {
    id: Uuid,
    order_id: Uuid,
    discount: i64,
}

impl From<DiscountRow> for Discount {
    fn from(row: DiscountRow) -> Self {
        Discount {
            id: DiscountId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            discount: row.discount,
        }
    }
}

#[async_trait]
impl RecordStore<Order, OrderFilter> for PostgresStore {
    #[instrument(skip(self), err)]
    async fn list(&self, filter: &OrderFilter, pagination: Pagination) -> StoreResult<Page<Order>> {
        let status = filter.status.map(|s| s.as_str());
        let (limit, offset) = limit_offset(pagination);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_sqlx_error("count_orders", e))?;

        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, status, total, qty_items, created_at, updated_at
            FROM orders
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        let orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(pagination.page_of(count_to_total(total), orders))
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn find(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, status, total, qty_items, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("find_order", e))?;
        row.map(Order::try_from).transpose()
    }

    #[instrument(skip(self, record), fields(order_id = %record.id), err)]
    async fn insert(&self, record: &Order) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, status, total, qty_items, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.map(|u| *u.as_uuid()))
        .bind(record.status.as_str())
        .bind(record.total)
        .bind(record.qty_items)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(order_id = %record.id, total = record.total), err)]
    async fn update(&self, record: &Order) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET user_id = $2, status = $3, total = $4, qty_items = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.map(|u| *u.as_uuid()))
        .bind(record.status.as_str())
        .bind(record.total)
        .bind(record.qty_items)
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_order", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("order"));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn delete(&self, id: OrderId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("delete_order", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OrderChildren for PostgresStore {
    type Error = StoreError;

    #[instrument(skip(self), fields(order_id = %order_id), err)]
    async fn sum_line_items(&self, order_id: OrderId, field: LineItemField) -> StoreResult<i64> {
        let sql = format!(
            "SELECT COALESCE(SUM({}), 0)::BIGINT FROM order_items WHERE order_id = $1",
            field.column()
        );
        sqlx::query_scalar(&sql)
            .bind(order_id.as_uuid())
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_sqlx_error("sum_line_items", e))
    }

    #[instrument(skip(self), fields(order_id = %order_id), err)]
    async fn sum_discounts(&self, order_id: OrderId, field: DiscountField) -> StoreResult<i64> {
        let sql = format!(
            "SELECT COALESCE(SUM({}), 0)::BIGINT FROM discounts WHERE order_id = $1",
            field.column()
        );
        sqlx::query_scalar(&sql)
            .bind(order_id.as_uuid())
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_sqlx_error("sum_discounts", e))
    }
}

// A missing parent order surfaces as a foreign key violation (23503).
fn missing_order(err: StoreError) -> StoreError {
    match err {
        StoreError::Validation(_) => StoreError::NotFound("order"),
        other => other,
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    #[instrument(skip(self, item), fields(order_id = %item.order_id), err)]
    async fn insert_line_item(&self, item: &LineItem) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, product_id, quantity, subtotal)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.order_id.as_uuid())
        .bind(item.product_id.as_uuid())
        .bind(item.quantity)
        .bind(item.subtotal)
        .execute(self.pool())
        .await
        .map_err(|e| missing_order(map_sqlx_error("insert_line_item", e)))?;
        Ok(())
    }

    #[instrument(skip(self, discount), fields(order_id = %discount.order_id), err)]
    async fn insert_discount(&self, discount: &Discount) -> StoreResult<()> {
        sqlx::query("INSERT INTO discounts (id, order_id, discount) VALUES ($1, $2, $3)")
            .bind(discount.id.as_uuid())
            .bind(discount.order_id.as_uuid())
            .bind(discount.discount)
            .execute(self.pool())
            .await
            .map_err(|e| missing_order(map_sqlx_error("insert_discount", e)))?;
        Ok(())
    }

    #[instrument(skip(self), fields(order_id = %order_id), err)]
    async fn line_items(&self, order_id: OrderId) -> StoreResult<Vec<LineItem>> {
        let rows: Vec<LineItemRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, product_id, quantity, subtotal
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_line_items", e))?;
        Ok(rows.into_iter().map(LineItem::from).collect())
    }

    #[instrument(skip(self), fields(order_id = %order_id), err)]
    async fn discounts(&self, order_id: OrderId) -> StoreResult<Vec<Discount>> {
        let rows: Vec<DiscountRow> = sqlx::query_as(
            "SELECT id, order_id, discount FROM discounts WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id.as_uuid())
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_discounts", e))?;
        Ok(rows.into_iter().map(Discount::from).collect())
    }
}
