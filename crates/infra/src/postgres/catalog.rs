use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;
use uuid::Uuid;

use storeadmin_core::{CategoryId, ImageId, Page, Pagination, ProductId};
use storeadmin_products::{Category, CategoryFilter, Product, ProductFilter};

use super::{PostgresStore, count_to_total, like_pattern, limit_offset};
use crate::error::{StoreError, StoreResult, map_sqlx_error};
use crate::store::RecordStore;

#[derive(Debug, FromRow)]
struct CategoryRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    image_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: CategoryId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            image_id: row.image_id.map(ImageId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: i64,
    image_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            image_id: row.image_id.map(ImageId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl RecordStore<Category, CategoryFilter> for PostgresStore {
    #[instrument(skip(self), err)]
    async fn list(&self, filter: &CategoryFilter, pagination: Pagination) -> StoreResult<Page<Category>> {
        let pattern = like_pattern(filter.title.as_deref());
        let (limit, offset) = limit_offset(pagination);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories WHERE ($1::text IS NULL OR title ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_sqlx_error("count_categories", e))?;

        let rows: Vec<CategoryRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, image_id, created_at, updated_at
            FROM categories
            WHERE ($1::text IS NULL OR title ILIKE $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_categories", e))?;

        Ok(pagination.page_of(count_to_total(total), rows).map(Category::from))
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn find(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT id, title, description, image_id, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("find_category", e))?;
        Ok(row.map(Category::from))
    }

    #[instrument(skip(self, record), fields(category_id = %record.id), err)]
    async fn insert(&self, record: &Category) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, title, description, image_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.image_id.map(|i| *i.as_uuid()))
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_category", e))?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(category_id = %record.id), err)]
    async fn update(&self, record: &Category) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET title = $2, description = $3, image_id = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.image_id.map(|i| *i.as_uuid()))
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_category", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("category"));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn delete(&self, id: CategoryId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("delete_category", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RecordStore<Product, ProductFilter> for PostgresStore {
    #[instrument(skip(self), err)]
    async fn list(&self, filter: &ProductFilter, pagination: Pagination) -> StoreResult<Page<Product>> {
        let pattern = like_pattern(filter.title.as_deref());
        let (limit, offset) = limit_offset(pagination);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_sqlx_error("count_products", e))?;

        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, price, image_id, created_at, updated_at
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        Ok(pagination.page_of(count_to_total(total), rows).map(Product::from))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, price, image_id, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_sqlx_error("find_product", e))?;
        Ok(row.map(Product::from))
    }

    #[instrument(skip(self, record), fields(product_id = %record.id), err)]
    async fn insert(&self, record: &Product) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, image_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.name)
        .bind(&record.description)
        .bind(record.price)
        .bind(record.image_id.map(|i| *i.as_uuid()))
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    #[instrument(skip(self, record), fields(product_id = %record.id), err)]
    async fn update(&self, record: &Product) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, image_id = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.name)
        .bind(&record.description)
        .bind(record.price)
        .bind(record.image_id.map(|i| *i.as_uuid()))
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("product"));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(result.rows_affected() > 0)
    }
}
