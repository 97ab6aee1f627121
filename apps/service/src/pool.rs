use anyhow::Result;
use deadpool::managed::{self, Pool, RecycleResult};
use libsql::{Builder, Connection, Database, Error as LibsqlError};
use tracing::debug;

use crate::config::DatabaseConfig;

/// Milliseconds a local connection waits on a locked database file
const BUSY_TIMEOUT_MS: u64 = 5_000;

pub struct LibsqlManager {
    database: Database,
    local: bool,
}

impl LibsqlManager {
    pub fn new(database: Database, local: bool) -> Self {
        Self { database, local }
    }
}

impl managed::Manager for LibsqlManager {
    type Type = Connection;
    type Error = LibsqlError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        let conn = self.database.connect()?;
        if self.local {
            // Sweep units write concurrently through separate connections.
            conn.query(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"), ()).await?;
            conn.query("PRAGMA journal_mode = WAL", ()).await?;
            conn.query("PRAGMA foreign_keys = ON", ()).await?;
        }
        Ok(conn)
    }

    async fn recycle(
        &self,
        conn: &mut Self::Type,
        _: &managed::Metrics,
    ) -> RecycleResult<Self::Error> {
        conn.query("SELECT 1", ())
            .await?
            .next()
            .await?
            .ok_or(LibsqlError::QueryReturnedNoRows)?;
        Ok(())
    }
}

pub type LibsqlPool = Pool<LibsqlManager>;

/// Open the configured libsql database and wrap it in a connection pool.
///
/// A configured `url` selects a remote database, otherwise the local file at
/// `path` is used (created on first use).
pub async fn open_pool(config: &DatabaseConfig) -> Result<LibsqlPool> {
    let (database, local) = match &config.url {
        Some(url) => {
            debug!("Opening remote libsql database at {url}");
            let token = config.auth_token.clone().unwrap_or_default();
            (Builder::new_remote(url.clone(), token).build().await?, false)
        }
        None => {
            debug!("Opening local libsql database at {}", config.path.display());
            (Builder::new_local(&config.path).build().await?, true)
        }
    };

    let pool = Pool::builder(LibsqlManager::new(database, local))
        .max_size(config.max_connections)
        .build()?;
    Ok(pool)
}
