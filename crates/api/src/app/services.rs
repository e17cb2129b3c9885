//! Store wiring shared by every handler.
//!
//! Handlers receive `Arc<AppServices>` through an `Extension` layer; there is no
//! global registry. One backing store implements every trait, and each field is
//! a trait-object view of it.

use std::sync::Arc;

use tracing::{info, warn};

use storeadmin_auth::{User, UserFilter};
use storeadmin_infra::{
    AppConfig, CategoryStore, InMemoryStore, OrderStore, PostgresStore, ProductStore,
    RecordStore, RoleStore, StoreResult, UserStore,
};
use storeadmin_products::{Category, CategoryFilter, Product, ProductFilter};

#[derive(Clone)]
pub struct AppServices {
    pub categories: Arc<CategoryStore>,
    pub products: Arc<ProductStore>,
    pub users: Arc<UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub orders: Arc<dyn OrderStore>,
}

impl AppServices {
    /// Wire every store to the same backing implementation.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: RecordStore<Category, CategoryFilter>
            + RecordStore<Product, ProductFilter>
            + RecordStore<User, UserFilter>
            + RoleStore
            + OrderStore
            + 'static,
    {
        let categories: Arc<CategoryStore> = store.clone();
        let products: Arc<ProductStore> = store.clone();
        let users: Arc<UserStore> = store.clone();
        let roles: Arc<dyn RoleStore> = store.clone();
        let orders: Arc<dyn OrderStore> = store;
        Self {
            categories,
            products,
            users,
            roles,
            orders,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }

    pub fn postgres(store: PostgresStore) -> Self {
        Self::from_store(Arc::new(store))
    }

    /// Postgres when `DATABASE_URL` is set, otherwise the in-memory store.
    pub async fn from_config(config: &AppConfig) -> StoreResult<Self> {
        match config.database_url {
            Some(_) => {
                let store = PostgresStore::connect(config).await?;
                info!("using postgres store");
                Ok(Self::postgres(store))
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
                Ok(Self::in_memory())
            }
        }
    }
}
