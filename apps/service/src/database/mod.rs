/// Database abstraction layer
///
/// Monitored functions and their pings live in libsql, accessed through the
/// `Database` trait so components only ever see the trait object.
pub mod migrations;
pub mod models;
pub mod repository;

pub use repository::{Database, DatabaseImpl};

use anyhow::Result;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::pool::open_pool;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}

/// Open the configured store and bring its schema up to date.
pub async fn open(config: &DatabaseConfig) -> Result<DatabaseImpl> {
    let pool = open_pool(config).await?;

    info!("Initializing database schema...");
    let conn = pool.get().await?;
    initialize_database(&conn).await?;
    drop(conn);

    Ok(DatabaseImpl::new_from_pool(pool))
}
