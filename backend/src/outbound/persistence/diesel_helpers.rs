//! Shared plumbing for the Diesel repositories.
//!
//! SQLite work runs on the blocking thread pool; these helpers bridge the
//! async port traits to synchronous Diesel calls and concentrate the error
//! mapping each repository would otherwise repeat.

use tracing::debug;

use super::pool::PoolError;

/// Run a synchronous repository operation on the blocking pool.
///
/// A cancelled or panicked blocking task is reported through the
/// repository's connection-error constructor so callers see a uniform
/// store failure.
pub(super) async fn run_blocking<T, E, F>(
    op: F,
    join_error: impl FnOnce(String) -> E,
) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    match tokio::task::spawn_blocking(op).await {
        Ok(result) => result,
        Err(err) => Err(join_error(format!("blocking task failed: {err}"))),
    }
}

/// Map pool errors into a repository-specific connection error constructor.
pub(super) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// True when the error is a SQLite unique-constraint violation.
pub(super) fn is_unique_violation(error: &diesel::result::Error) -> bool {
    matches!(
        error,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )
    )
}

/// The column named by a unique-constraint violation, e.g. `users.email`.
pub(super) fn unique_violation_target(error: &diesel::result::Error) -> Option<String> {
    if let diesel::result::Error::DatabaseError(
        diesel::result::DatabaseErrorKind::UniqueViolation,
        info,
    ) = error
    {
        // SQLite reports "UNIQUE constraint failed: table.column".
        return info
            .message()
            .rsplit(':')
            .next()
            .map(|target| target.trim().to_owned());
    }
    None
}

/// Map common Diesel error variants into query/connection constructors.
pub(super) fn map_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: Fn(String) -> E,
    C: Fn(String) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error".to_owned())
        }
        other => query(other.to_string()),
    }
}
