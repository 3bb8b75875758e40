//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend
//! only on the domain services and stay testable with stub repositories.

use std::sync::Arc;

use crate::domain::ports::{
    CategoryRepository, DepartmentRepository, JobRepository, UserRepository,
};
use crate::domain::{DepartmentsService, JobsService, UsersService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: UsersService,
    pub jobs: JobsService,
    pub departments: DepartmentsService,
    pub categories: Arc<dyn CategoryRepository>,
}

impl HttpState {
    /// Wire the services from their repository ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        jobs: Arc<dyn JobRepository>,
        departments: Arc<dyn DepartmentRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            users: UsersService::new(users.clone()),
            jobs: JobsService::new(jobs, users),
            departments: DepartmentsService::new(departments),
            categories,
        }
    }
}
