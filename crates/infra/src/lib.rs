//! Infrastructure layer: storage adapters, configuration, seeding.

pub mod config;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod seed;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use seed::{RoleSeeder, SeedReport};
pub use store::{CategoryStore, OrderStore, ProductStore, RecordStore, RoleStore, UserStore};
