//! Port abstraction for category persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::Category;

/// Persistence errors raised by category repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryStoreError {
    /// Repository connection could not be established.
    #[error("category store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("category store query failed: {message}")]
    Query { message: String },
}

impl CategoryStoreError {
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

/// Durable storage for category tags.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, CategoryStoreError>;

    /// Look up a category by unique name, creating it when absent.
    /// Idempotent: a lost uniqueness race resolves by re-querying.
    async fn find_or_create(&self, name: &str) -> Result<Category, CategoryStoreError>;
}
