//! Port abstraction for department persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{Department, NewDepartment};

/// Persistence errors raised by department repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DepartmentStoreError {
    /// Repository connection could not be established.
    #[error("department store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("department store query failed: {message}")]
    Query { message: String },
    /// Another department already holds this email address.
    #[error("email already registered")]
    DuplicateEmail,
    /// No department with the requested id.
    #[error("department not found")]
    NotFound,
    /// The chief does not reference an existing user.
    #[error("chief does not exist")]
    UnknownChief,
}

impl DepartmentStoreError {
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

/// Durable storage for departments and their member sets.
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn insert(&self, department: NewDepartment) -> Result<Department, DepartmentStoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Department>, DepartmentStoreError>;

    async fn list(&self) -> Result<Vec<Department>, DepartmentStoreError>;

    /// Replace every field of an existing department, including the member
    /// set, in one transaction.
    async fn update(
        &self,
        id: i32,
        department: NewDepartment,
    ) -> Result<Department, DepartmentStoreError>;

    async fn delete(&self, id: i32) -> Result<(), DepartmentStoreError>;
}
