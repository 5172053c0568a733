//! Storage infrastructure - connection pooling and schema migrations

pub mod migrations;
mod postgres;

pub use migrations::{
    revert_last_migration, run_storage_migrations, storage_migrations, Migration,
    PostgresMigrator,
};
pub use postgres::{connect, PostgresConfig};
