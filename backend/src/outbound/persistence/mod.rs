//! Persistence adapters backed by Diesel and a single SQLite store file.

mod diesel_category_repository;
mod diesel_department_repository;
mod diesel_helpers;
mod diesel_job_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
pub mod schema;

pub use diesel_category_repository::DieselCategoryRepository;
pub use diesel_department_repository::DieselDepartmentRepository;
pub use diesel_job_repository::DieselJobRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbConnection, DbPool, PoolConfig, PoolError, checkout};
