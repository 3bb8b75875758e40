//! Domain entities, services, and ports.
//!
//! Everything here is transport agnostic: the inbound HTTP adapters map the
//! [`Error`] type to status codes, and the outbound persistence adapters
//! implement the traits under [`ports`].

mod auth;
mod category;
mod department;
mod departments_service;
mod error;
mod job;
mod jobs_service;
pub mod password;
pub mod ports;
mod user;
mod users_service;

pub use self::auth::Caller;
pub use self::category::Category;
pub use self::department::{Department, NewDepartment};
pub use self::departments_service::DepartmentsService;
pub use self::error::{Error, ErrorCode};
pub use self::job::{Job, JobUpdate, NewJob, format_id_list, parse_id_list};
pub use self::jobs_service::{JobListing, JobsService};
pub use self::user::{CredentialRecord, NewUser, User, UserUpdate};
pub use self::users_service::{Registration, UserChanges, UsersService};

/// Convenient result alias for domain operations.
pub type DomainResult<T> = Result<T, Error>;
