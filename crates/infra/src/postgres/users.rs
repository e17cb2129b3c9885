use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::instrument;
use uuid::Uuid;

use storeadmin_auth::{NewRole, Role, User, UserFilter};
use storeadmin_core::{ImageId, Page, Pagination, RoleId, UserId};

use super::{PostgresStore, count_to_total, like_pattern, limit_offset};
use crate::error::{StoreError, StoreResult, map_sqlx_error};
use crate::store::{RecordStore, RoleStore};

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    surname: String,
    email: String,
    password_hash: String,
    image_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::from_uuid(row.id),
            name: row.name,
            surname: row.surname,
            email: row.email,
            password_hash: row.password_hash,
            image_id: row.image_id.map(ImageId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role {
            id: RoleId::from_uuid(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
        }
    }
}

const USER_COLUMNS: &str =
    "id, name, surname, email, password_hash, image_id, created_at, updated_at";

const USER_FILTER: &str =
    "($1::text IS NULL OR name ILIKE $1 OR surname ILIKE $1 OR email ILIKE $1)";

#[async_trait]
impl RecordStore<User, UserFilter> for PostgresStore {
    #[instrument(skip(self), err)]
    async fn list(&self, filter: &UserFilter, pagination: Pagination) -> StoreResult<Page<User>> {
        let pattern = like_pattern(filter.name.as_deref());
        let (limit, offset) = limit_offset(pagination);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {USER_FILTER}"))
            .bind(&pattern)
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_sqlx_error("count_users", e))?;

        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {USER_FILTER} ORDER BY id LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;

        Ok(pagination.page_of(count_to_total(total), rows).map(User::from))
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find(&self, id: UserId) -> StoreResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(self.pool())
                .await
                .map_err(|e| map_sqlx_error("find_user", e))?;
        Ok(row.map(User::from))
    }

    #[instrument(skip(self, record), fields(user_id = %record.id), err)]
    async fn insert(&self, record: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, surname, email, password_hash, image_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.name)
        .bind(&record.surname)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.image_id.map(|i| *i.as_uuid()))
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    // The password hash is only written on insert.
    #[instrument(skip(self, record), fields(user_id = %record.id), err)]
    async fn update(&self, record: &User) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, surname = $3, email = $4, image_id = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.name)
        .bind(&record.surname)
        .bind(&record.email)
        .bind(record.image_id.map(|i| *i.as_uuid()))
        .bind(record.updated_at)
        .execute(self.pool())
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn delete(&self, id: UserId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RoleStore for PostgresStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Role>> {
        let rows: Vec<RoleRow> =
            sqlx::query_as("SELECT id, name, slug, description FROM roles ORDER BY id")
                .fetch_all(self.pool())
                .await
                .map_err(|e| map_sqlx_error("list_roles", e))?;
        Ok(rows.into_iter().map(Role::from).collect())
    }

    #[instrument(skip(self), err)]
    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Role>> {
        let row: Option<RoleRow> =
            sqlx::query_as("SELECT id, name, slug, description FROM roles WHERE slug = $1")
                .bind(slug)
                .fetch_optional(self.pool())
                .await
                .map_err(|e| map_sqlx_error("find_role_by_slug", e))?;
        Ok(row.map(Role::from))
    }

    #[instrument(skip(self), fields(slug = %role.slug), err)]
    async fn create(&self, role: NewRole) -> StoreResult<Role> {
        let role = role.into_role(RoleId::new())?;
        sqlx::query("INSERT INTO roles (id, name, slug, description) VALUES ($1, $2, $3, $4)")
            .bind(role.id.as_uuid())
            .bind(&role.name)
            .bind(&role.slug)
            .bind(&role.description)
            .execute(self.pool())
            .await
            .map_err(|e| map_sqlx_error("insert_role", e))?;
        Ok(role)
    }
}
