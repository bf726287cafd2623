//! Connections to the shared SQLite database file.
//!
//! Both backends open the same file. The query-builder backend uses a
//! `sqlx` pool; the ORM backend drives one Diesel connection through
//! `diesel-async`'s `SyncConnectionWrapper`, serialised behind an async
//! mutex because SQLite allows a single writer at a time anyway.
//!
//! # Design
//!
//! - Opening runs the embedded migrations before either backend is used
//! - Foreign keys and the busy timeout are enabled on every connection
//! - All errors are mapped to `PoolError` variants

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use super::migrations::MIGRATIONS;

/// Async Diesel connection over SQLite.
pub type AsyncSqliteConnection = SyncConnectionWrapper<SqliteConnection>;

/// Errors that can occur while opening the database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The database file could not be opened.
    #[error("failed to open database: {message}")]
    Open { message: String },

    /// Pending migrations could not be applied.
    #[error("failed to run migrations: {message}")]
    Migration { message: String },
}

impl PoolError {
    /// Create an open error with the given message.
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open {
            message: message.into(),
        }
    }

    /// Create a migration error with the given message.
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }
}

/// Configuration for the database connections.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use showcase::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("showcase.db")
///     .with_max_connections(4)
///     .with_busy_timeout(Duration::from_secs(2));
/// assert_eq!(config.database_path().to_str(), Some("showcase.db"));
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_path: PathBuf,
    max_connections: u32,
    busy_timeout: Duration,
}

impl PoolConfig {
    /// Create a new configuration for the given database file.
    ///
    /// Uses sensible defaults:
    /// - `max_connections`: 5 (query-builder pool only)
    /// - `busy_timeout`: 5 seconds
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Set the maximum number of pooled `sqlx` connections.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Set how long SQLite waits on a locked database.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Get the database path.
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }
}

/// Shared Diesel connection for the ORM backend.
#[derive(Clone)]
pub struct DbPool {
    inner: Arc<Mutex<AsyncSqliteConnection>>,
}

impl DbPool {
    /// Open the database, apply migrations and wrap the connection.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Open` if the file cannot be opened and
    /// `PoolError::Migration` if the schema cannot be brought up to date.
    pub async fn open(config: &PoolConfig) -> Result<Self, PoolError> {
        let path = path_text(config.database_path())?;
        let busy_timeout = config.busy_timeout;
        let connection = tokio::task::spawn_blocking(move || open_and_migrate(&path, busy_timeout))
            .await
            .map_err(|err| PoolError::open(err.to_string()))??;
        Ok(Self {
            inner: Arc::new(Mutex::new(SyncConnectionWrapper::new(connection))),
        })
    }

    /// Wait for exclusive use of the connection.
    pub async fn get(&self) -> MutexGuard<'_, AsyncSqliteConnection> {
        self.inner.lock().await
    }
}

impl std::fmt::Debug for DbPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbPool").finish_non_exhaustive()
    }
}

/// Open the `sqlx` pool for the query-builder backend.
///
/// The schema must already exist; open a [`DbPool`] first.
///
/// # Errors
///
/// Returns `PoolError::Open` if the pool cannot connect.
pub async fn connect_sqlx(config: &PoolConfig) -> Result<SqlitePool, PoolError> {
    let options = SqliteConnectOptions::new()
        .filename(config.database_path())
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout);
    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|err| PoolError::open(err.to_string()))
}

fn path_text(path: &Path) -> Result<String, PoolError> {
    path.to_str()
        .map(str::to_owned)
        .ok_or_else(|| PoolError::open(format!("database path {} is not UTF-8", path.display())))
}

fn open_and_migrate(path: &str, busy_timeout: Duration) -> Result<SqliteConnection, PoolError> {
    let mut connection =
        SqliteConnection::establish(path).map_err(|err| PoolError::open(err.to_string()))?;
    let pragmas = format!(
        "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
        busy_timeout.as_millis()
    );
    connection
        .batch_execute(&pragmas)
        .map_err(|err| PoolError::open(err.to_string()))?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| PoolError::migration(err.to_string()))?;
    info!(path, applied = applied.len(), "database ready");
    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_config_default_values() {
        let config = PoolConfig::new("showcase.db");

        assert_eq!(config.database_path(), Path::new("showcase.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[rstest]
    fn pool_config_builder_pattern() {
        let config = PoolConfig::new("showcase.db")
            .with_max_connections(2)
            .with_busy_timeout(Duration::from_millis(250));

        assert_eq!(config.max_connections, 2);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[rstest]
    fn pool_error_display() {
        let open_err = PoolError::open("unable to open database file");
        let migration_err = PoolError::migration("table users already exists");

        assert!(open_err.to_string().contains("unable to open"));
        assert!(migration_err.to_string().contains("users already exists"));
    }

    #[rstest]
    #[tokio::test]
    async fn opening_twice_reuses_the_migrated_schema() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = PoolConfig::new(dir.path().join("pool.db"));

        DbPool::open(&config).await.expect("first open");
        DbPool::open(&config).await.expect("second open");
        let pool = connect_sqlx(&config).await.expect("sqlx pool");
        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'posts') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .expect("table names");

        assert_eq!(tables, vec![("posts".to_owned(),), ("users".to_owned(),)]);
    }
}
