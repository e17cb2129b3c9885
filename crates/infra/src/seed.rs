//! Database seeding.

use tracing::{debug, info};

use storeadmin_auth::{NewRole, default_roles};

use crate::error::StoreResult;
use crate::store::RoleStore;

/// Outcome of one seeder run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Inserts the bootstrap roles. Roles whose slug already exists are left alone,
/// so running the seeder again is a no-op.
#[derive(Debug, Clone)]
pub struct RoleSeeder {
    roles: Vec<NewRole>,
}

impl Default for RoleSeeder {
    fn default() -> Self {
        Self {
            roles: default_roles(),
        }
    }
}

impl RoleSeeder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roles(roles: Vec<NewRole>) -> Self {
        Self { roles }
    }

    pub async fn run(&self, store: &dyn RoleStore) -> StoreResult<SeedReport> {
        let mut report = SeedReport::default();
        for role in &self.roles {
            if store.find_by_slug(&role.slug).await?.is_some() {
                debug!(slug = %role.slug, "role already present");
                report.skipped.push(role.slug.clone());
                continue;
            }
            let created = store.create(role.clone()).await?;
            info!(slug = %created.slug, role_id = %created.id, "role created");
            report.created.push(created.slug);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory::InMemoryStore;

    #[tokio::test]
    async fn seeds_the_default_roles_once() {
        let store = InMemoryStore::new();
        let seeder = RoleSeeder::new();

        let first = seeder.run(&store).await.unwrap();
        assert_eq!(first.created, ["admin", "manager", "client"]);
        assert!(first.skipped.is_empty());

        let second = seeder.run(&store).await.unwrap();
        assert!(second.created.is_empty());
        assert_eq!(second.skipped, ["admin", "manager", "client"]);

        let roles = RoleStore::list(&store).await.unwrap();
        assert_eq!(roles.len(), 3);
        let admin = store.find_by_slug("admin").await.unwrap().unwrap();
        assert_eq!(admin.description.as_deref(), Some("System Administrator"));
    }

    #[tokio::test]
    async fn invalid_roles_abort_the_run() {
        let store = InMemoryStore::new();
        let seeder = RoleSeeder::with_roles(vec![NewRole::new("Bad", "Not A Slug", "x")]);
        let err = seeder.run(&store).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
