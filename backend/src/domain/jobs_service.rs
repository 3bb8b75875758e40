//! Job management service.
//!
//! Create/read/update/delete over the job repository, with the ownership
//! gate applied to every mutation: only the job's team leader or an
//! administrator may edit or delete it. The REST blueprint calls in as
//! [`Caller::System`], matching the original unauthenticated contract.

use std::sync::Arc;

use crate::domain::ports::{JobRepository, JobStoreError, UserRepository, UserStoreError};
use crate::domain::{Caller, Error, Job, JobUpdate, NewJob};

/// A job joined with its team leader's display name, for list views.
#[derive(Debug, Clone)]
pub struct JobListing {
    pub job: Job,
    pub team_leader_name: String,
}

/// Job operations over the repository ports.
#[derive(Clone)]
pub struct JobsService {
    jobs: Arc<dyn JobRepository>,
    users: Arc<dyn UserRepository>,
}

fn map_store_error(error: JobStoreError) -> Error {
    match error {
        JobStoreError::Connection { message } => Error::service_unavailable(message),
        JobStoreError::Query { message } => Error::internal(message),
        JobStoreError::DuplicateId => Error::conflict("Id already exists"),
        JobStoreError::NotFound => Error::not_found("Job not found"),
        JobStoreError::UnknownTeamLeader => Error::invalid_request("Team leader does not exist"),
    }
}

fn map_user_store_error(error: UserStoreError) -> Error {
    match error {
        UserStoreError::Connection { message } => Error::service_unavailable(message),
        other => Error::internal(other.to_string()),
    }
}

impl JobsService {
    pub fn new(jobs: Arc<dyn JobRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { jobs, users }
    }

    /// Create a job. Honors an explicit id, resolves category names
    /// find-or-create, and validates the work size.
    pub async fn create(&self, input: NewJob) -> Result<Job, Error> {
        if input.work_size < 1 {
            return Err(Error::invalid_request("Work size must be a positive integer"));
        }
        self.jobs.insert(input).await.map_err(map_store_error)
    }

    pub async fn get(&self, id: i32) -> Result<Job, Error> {
        self.jobs
            .find_by_id(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("Job not found"))
    }

    pub async fn list(&self) -> Result<Vec<Job>, Error> {
        self.jobs.list().await.map_err(map_store_error)
    }

    /// Job list with the team-leader reference eagerly resolved for display.
    pub async fn list_with_leaders(&self) -> Result<Vec<JobListing>, Error> {
        let jobs = self.list().await?;
        let users = self.users.list().await.map_err(map_user_store_error)?;
        let names: std::collections::HashMap<i32, String> =
            users.into_iter().map(|u| (u.id, u.full_name())).collect();
        Ok(jobs
            .into_iter()
            .map(|job| {
                let team_leader_name = names
                    .get(&job.team_leader)
                    .cloned()
                    .unwrap_or_else(|| format!("colonist {}", job.team_leader));
                JobListing {
                    job,
                    team_leader_name,
                }
            })
            .collect())
    }

    /// Unfinished jobs below a work-size threshold, for the roster reports.
    pub async fn open_below(&self, work_size: i32) -> Result<Vec<Job>, Error> {
        self.jobs
            .list_open_below(work_size)
            .await
            .map_err(map_store_error)
    }

    /// Gate check without mutating, used by the edit form.
    pub async fn check_may_modify(&self, caller: &Caller, id: i32) -> Result<Job, Error> {
        let job = self.get(id).await?;
        if caller.may_modify(&job) {
            Ok(job)
        } else {
            Err(Error::forbidden("You cannot edit this job."))
        }
    }

    /// Apply a partial update behind the ownership gate.
    pub async fn update(&self, caller: &Caller, id: i32, patch: JobUpdate) -> Result<Job, Error> {
        if let Some(work_size) = patch.work_size {
            if work_size < 1 {
                return Err(Error::invalid_request("Work size must be a positive integer"));
            }
        }
        let job = self.get(id).await?;
        if !caller.may_modify(&job) {
            return Err(Error::forbidden("You cannot edit this job."));
        }
        self.jobs.update(id, patch).await.map_err(map_store_error)
    }

    /// Delete behind the ownership gate.
    pub async fn delete(&self, caller: &Caller, id: i32) -> Result<(), Error> {
        let job = self.get(id).await?;
        if !caller.may_modify(&job) {
            return Err(Error::forbidden("You cannot delete this job."));
        }
        self.jobs.delete(id).await.map_err(map_store_error)
    }
}
