//! Run the database seeders against the configured store.

use anyhow::Context;

use storeadmin_infra::{AppConfig, PostgresStore, RoleSeeder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storeadmin_observability::init();

    let config = AppConfig::from_env()?;
    if config.database_url.is_none() {
        anyhow::bail!("DATABASE_URL must be set to seed a database");
    }

    let store = PostgresStore::connect(&config)
        .await
        .context("failed to connect to postgres")?;

    let report = RoleSeeder::new().run(&store).await?;
    tracing::info!(
        created = report.created.len(),
        skipped = report.skipped.len(),
        "role seeding finished"
    );
    Ok(())
}
