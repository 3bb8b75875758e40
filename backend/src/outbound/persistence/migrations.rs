//! Embedded schema migrations.
//!
//! The schema is auto-created on first run; re-running against an existing
//! store applies nothing.

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use super::pool::{DbPool, checkout};

/// Migrations compiled into the binary from `backend/migrations/`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while preparing the schema.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not check out a connection to migrate on.
    #[error("migration connection failed: {0}")]
    Connection(#[from] super::pool::PoolError),
    /// A migration failed to apply.
    #[error("migration failed: {0}")]
    Apply(String),
}

/// Apply any pending migrations against the pool's store.
pub fn run_migrations(pool: &DbPool) -> Result<(), MigrationError> {
    let mut conn = checkout(pool)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply(err.to_string()))?;
    Ok(())
}
