//! Domain ports for the hexagonal boundary.

mod category_repository;
mod department_repository;
mod job_repository;
mod user_repository;

pub use category_repository::{CategoryRepository, CategoryStoreError};
pub use department_repository::{DepartmentRepository, DepartmentStoreError};
pub use job_repository::{JobRepository, JobStoreError};
pub use user_repository::{UserRepository, UserStoreError};
