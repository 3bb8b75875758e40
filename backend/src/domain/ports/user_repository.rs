//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{CredentialRecord, NewUser, User, UserUpdate};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserStoreError {
    /// Repository connection could not be established.
    #[error("user store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user store query failed: {message}")]
    Query { message: String },
    /// Another user already holds this email address.
    #[error("email already registered")]
    DuplicateEmail,
    /// The explicit id is already taken.
    #[error("id already exists")]
    DuplicateId,
    /// No user with the requested id.
    #[error("user not found")]
    NotFound,
    /// The user is still referenced as a job's team leader or a
    /// department's chief; delete is restricted.
    #[error("user is still referenced as a team leader or chief")]
    Referenced,
}

impl UserStoreError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Durable storage for colonist records. Every method runs as its own
/// transaction; no handle outlives the call.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, honoring an explicit id when provided. Returns the
    /// stored record.
    async fn insert(&self, user: NewUser) -> Result<User, UserStoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserStoreError>;

    /// Fetch a user and its credential for authentication.
    async fn find_by_email(&self, email: &str)
    -> Result<Option<CredentialRecord>, UserStoreError>;

    async fn list(&self) -> Result<Vec<User>, UserStoreError>;

    /// Residents of a module (exact address match).
    async fn list_by_address(&self, address: &str) -> Result<Vec<User>, UserStoreError>;

    /// Colonists strictly younger than the threshold.
    async fn list_younger_than(&self, age: i32) -> Result<Vec<User>, UserStoreError>;

    /// Apply a partial update; email uniqueness is re-validated against all
    /// other users inside the same transaction.
    async fn update(&self, id: i32, patch: UserUpdate) -> Result<User, UserStoreError>;

    /// Delete a user; restricted when referenced (see [`UserStoreError::Referenced`]).
    async fn delete(&self, id: i32) -> Result<(), UserStoreError>;

    async fn count(&self) -> Result<i64, UserStoreError>;
}
