//! SQLite-backed `CategoryRepository` implementation using Diesel.
//!
//! Shares the find-or-create helper with the job repository so both paths
//! resolve names identically.

use async_trait::async_trait;
use diesel::prelude::*;

use crate::domain::Category;
use crate::domain::ports::{CategoryRepository, CategoryStoreError};

use super::diesel_helpers::{map_diesel_error, map_pool_error, run_blocking};
use super::diesel_job_repository::resolve_category;
use super::models::CategoryRow;
use super::pool::{DbPool, checkout};
use super::schema::categories;

/// Diesel-backed implementation of the `CategoryRepository` port.
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<diesel::result::Error> for CategoryStoreError {
    fn from(error: diesel::result::Error) -> Self {
        map_diesel_error(error, Self::query, Self::connection)
    }
}

fn get_connection(pool: &DbPool) -> Result<super::pool::DbConnection, CategoryStoreError> {
    checkout(pool).map_err(|err| map_pool_error(err, CategoryStoreError::connection))
}

#[async_trait]
impl CategoryRepository for DieselCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, CategoryStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                let rows: Vec<CategoryRow> = categories::table
                    .order(categories::id.asc())
                    .select(CategoryRow::as_select())
                    .load(&mut conn)?;
                Ok(rows.into_iter().map(CategoryRow::into_category).collect())
            },
            CategoryStoreError::connection,
        )
        .await
    }

    async fn find_or_create(&self, name: &str) -> Result<Category, CategoryStoreError> {
        let pool = self.pool.clone();
        let name = name.to_owned();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                let category = conn.immediate_transaction::<_, diesel::result::Error, _>(|conn| {
                    let id = resolve_category(conn, &name)?;
                    Ok(Category {
                        id,
                        name: name.clone(),
                    })
                })?;
                Ok(category)
            },
            CategoryStoreError::connection,
        )
        .await
    }
}
