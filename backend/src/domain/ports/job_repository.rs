//! Port abstraction for job persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{Job, JobUpdate, NewJob};

/// Persistence errors raised by job repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobStoreError {
    /// Repository connection could not be established.
    #[error("job store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("job store query failed: {message}")]
    Query { message: String },
    /// The explicit id is already taken.
    #[error("id already exists")]
    DuplicateId,
    /// No job with the requested id.
    #[error("job not found")]
    NotFound,
    /// The team leader does not reference an existing user.
    #[error("team leader does not exist")]
    UnknownTeamLeader,
}

impl JobStoreError {
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

/// Durable storage for jobs, including collaborator and category
/// associations. Category names are resolved find-or-create inside the same
/// transaction as the job mutation, so a failure never leaves a job half
/// tagged.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a job with its collaborator set and category names. Honors an
    /// explicit id when provided.
    async fn insert(&self, job: NewJob) -> Result<Job, JobStoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Job>, JobStoreError>;

    async fn list(&self) -> Result<Vec<Job>, JobStoreError>;

    /// Unfinished jobs below a work-size threshold.
    async fn list_open_below(&self, work_size: i32) -> Result<Vec<Job>, JobStoreError>;

    /// Apply a partial update; a present category list fully replaces the
    /// association set (clear then re-add, one transaction).
    async fn update(&self, id: i32, patch: JobUpdate) -> Result<Job, JobStoreError>;

    async fn delete(&self, id: i32) -> Result<(), JobStoreError>;
}
