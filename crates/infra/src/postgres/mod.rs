//! Postgres-backed stores.
//!
//! ## Schema
//!
//! Tables are created by the migrations in `crates/infra/migrations`, applied on
//! [`PostgresStore::connect`]. Line items and discounts reference their order with
//! `ON DELETE CASCADE`, so deleting an order removes its children in the same statement.
//!
//! ## Ordering
//!
//! Ids are UUIDv7 (time ordered); every listing is `ORDER BY id`, i.e. oldest first.
//!
//! ## Thread Safety
//!
//! `PostgresStore` is `Send + Sync` and cheap to clone; all access goes through the
//! SQLx connection pool.

mod catalog;
mod orders;
mod users;

use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::AppConfig;
use crate::error::{StoreError, StoreResult, map_sqlx_error};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `config.database_url` and run pending migrations.
    pub async fn connect(config: &AppConfig) -> StoreResult<Self> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| StoreError::Storage("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!(max_connections = config.db_max_connections, "postgres pool ready");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `ILIKE` pattern for a case-insensitive substring match, or `None` for "no filter".
///
/// `%`, `_` and `\` in user input are escaped so they match literally.
pub(crate) fn like_pattern(term: Option<&str>) -> Option<String> {
    let term = term.map(str::trim).filter(|t| !t.is_empty())?;
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    Some(escaped)
}

/// `u64` pagination values as the `BIGINT`s Postgres expects.
pub(crate) fn limit_offset(pagination: storeadmin_core::Pagination) -> (i64, i64) {
    (
        i64::from(pagination.limit),
        i64::try_from(pagination.offset()).unwrap_or(i64::MAX),
    )
}

pub(crate) fn count_to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeadmin_core::Pagination;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern(Some("shoe")), Some("%shoe%".to_string()));
        assert_eq!(like_pattern(Some("50%_off")), Some("%50\\%\\_off%".to_string()));
    }

    #[test]
    fn blank_terms_disable_the_filter() {
        assert_eq!(like_pattern(None), None);
        assert_eq!(like_pattern(Some("   ")), None);
    }

    #[test]
    fn limit_offset_follows_the_page() {
        assert_eq!(limit_offset(Pagination::new(Some(3), Some(10))), (10, 20));
    }
}
