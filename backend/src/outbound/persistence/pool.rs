//! Connection pool for the SQLite store file.
//!
//! Diesel's SQLite backend is synchronous, so repositories check out a
//! pooled connection inside `spawn_blocking`. Each checkout opens one
//! transactional scope per operation and releases it on every exit path.

use diesel::SqliteConnection;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};

/// Shared pool handle used by all repositories.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// A checked-out connection.
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Per-connection pragmas: enforce foreign keys and wait on writer locks
/// instead of failing immediately when requests overlap.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Configuration for the store connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
}

impl PoolConfig {
    /// Create a new configuration for the given SQLite path (or URL).
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 8,
        }
    }

    /// Set the maximum number of connections in the pool.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Build the pool, validating that a first connection can be opened.
    pub fn build(self) -> Result<DbPool, PoolError> {
        let manager = ConnectionManager::<SqliteConnection>::new(&self.database_url);
        Pool::builder()
            .max_size(self.max_size)
            .connection_customizer(Box::new(SqlitePragmas))
            .build(manager)
            .map_err(|err| PoolError::build(err.to_string()))
    }
}

/// Check out a connection, mapping pool exhaustion to [`PoolError`].
pub fn checkout(pool: &DbPool) -> Result<DbConnection, PoolError> {
    pool.get().map_err(|err| PoolError::checkout(err.to_string()))
}
