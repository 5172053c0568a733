//! Migrate command - applies the PostgreSQL schema and exits

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::{logging, storage};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead of applying
    #[arg(long)]
    pub revert_last: bool,
}

/// Run migrations against `storage.database_url` or `DATABASE_URL`
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let pool = crate::connect_postgres(&config.storage).await?;

    if args.revert_last {
        match storage::revert_last_migration(&pool).await? {
            Some(version) => info!(version, "Reverted migration"),
            None => info!("No migrations to revert"),
        }
    } else {
        let applied = storage::run_storage_migrations(&pool).await?;
        let version = storage::PostgresMigrator::new(pool.clone())
            .current_version()
            .await?;
        info!(applied, version = ?version, "Migrations complete");
    }

    pool.close().await;

    Ok(())
}
