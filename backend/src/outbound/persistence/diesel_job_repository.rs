//! SQLite-backed `JobRepository` implementation using Diesel.
//!
//! Job mutations touch up to three tables (the job row, the collaborator
//! junction, and the category junction plus find-or-create of category
//! rows); each operation runs as one transaction so failures never leave a
//! job half tagged. Write transactions begin immediate: overlapping writers
//! queue on the writer lock instead of failing when a deferred read
//! snapshot goes stale.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use crate::domain::ports::{JobRepository, JobStoreError};
use crate::domain::{Job, JobUpdate, NewJob};

use super::diesel_helpers::{
    is_unique_violation, map_diesel_error, map_pool_error, run_blocking, unique_violation_target,
};
use super::models::{JobCategoryRow, JobChangeset, JobCollaboratorRow, JobRow, NewJobRow};
use super::pool::{DbPool, checkout};
use super::schema::{categories, job_categories, job_collaborators, jobs, users};

/// Diesel-backed implementation of the `JobRepository` port.
#[derive(Clone)]
pub struct DieselJobRepository {
    pool: DbPool,
}

impl DieselJobRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<diesel::result::Error> for JobStoreError {
    fn from(error: diesel::result::Error) -> Self {
        if is_unique_violation(&error) {
            return match unique_violation_target(&error).as_deref() {
                Some("jobs.id") => Self::DuplicateId,
                _ => Self::query(error.to_string()),
            };
        }
        if matches!(error, diesel::result::Error::NotFound) {
            return Self::NotFound;
        }
        map_diesel_error(error, Self::query, Self::connection)
    }
}

fn get_connection(pool: &DbPool) -> Result<super::pool::DbConnection, JobStoreError> {
    checkout(pool).map_err(|err| map_pool_error(err, JobStoreError::connection))
}

fn team_leader_exists(conn: &mut SqliteConnection, id: i32) -> Result<bool, diesel::result::Error> {
    let count: i64 = users::table
        .filter(users::id.eq(id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Find-or-create a category by unique name, returning its id.
///
/// A concurrent create of a brand-new name can make the insert lose the
/// uniqueness race; the loser re-queries instead of surfacing the violation.
pub(super) fn resolve_category(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<i32, diesel::result::Error> {
    let existing: Option<i32> = categories::table
        .filter(categories::name.eq(name))
        .select(categories::id)
        .first(conn)
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let inserted = diesel::insert_into(categories::table)
        .values(super::models::NewCategoryRow { name })
        .returning(categories::id)
        .get_result(conn);
    match inserted {
        Ok(id) => Ok(id),
        Err(err) if is_unique_violation(&err) => categories::table
            .filter(categories::name.eq(name))
            .select(categories::id)
            .first(conn),
        Err(err) => Err(err),
    }
}

fn replace_collaborators(
    conn: &mut SqliteConnection,
    job_id: i32,
    collaborators: &[i32],
) -> Result<(), diesel::result::Error> {
    diesel::delete(job_collaborators::table.filter(job_collaborators::job_id.eq(job_id)))
        .execute(conn)?;
    let mut ids = collaborators.to_vec();
    ids.sort_unstable();
    ids.dedup();
    let rows: Vec<JobCollaboratorRow> = ids
        .into_iter()
        .map(|user_id| JobCollaboratorRow { job_id, user_id })
        .collect();
    diesel::insert_into(job_collaborators::table)
        .values(rows)
        .execute(conn)?;
    Ok(())
}

/// Clear then re-add the category associations (full replacement).
fn replace_categories(
    conn: &mut SqliteConnection,
    job_id: i32,
    names: &[String],
) -> Result<(), diesel::result::Error> {
    diesel::delete(job_categories::table.filter(job_categories::job_id.eq(job_id)))
        .execute(conn)?;
    let mut seen = Vec::new();
    for name in names {
        let category_id = resolve_category(conn, name)?;
        if seen.contains(&category_id) {
            continue;
        }
        seen.push(category_id);
        diesel::insert_into(job_categories::table)
            .values(JobCategoryRow {
                job_id,
                category_id,
            })
            .execute(conn)?;
    }
    Ok(())
}

/// Assemble the full domain job from its row plus both junctions.
fn load_job(conn: &mut SqliteConnection, row: JobRow) -> Result<Job, diesel::result::Error> {
    let collaborators: Vec<i32> = job_collaborators::table
        .filter(job_collaborators::job_id.eq(row.id))
        .order(job_collaborators::user_id.asc())
        .select(job_collaborators::user_id)
        .load(conn)?;
    let category_names: Vec<String> = job_categories::table
        .inner_join(categories::table)
        .filter(job_categories::job_id.eq(row.id))
        .order(categories::name.asc())
        .select(categories::name)
        .load(conn)?;
    Ok(Job {
        id: row.id,
        team_leader: row.team_leader,
        job: row.job,
        work_size: row.work_size,
        collaborators,
        start_date: row.start_date,
        end_date: row.end_date,
        is_finished: row.is_finished,
        categories: category_names,
    })
}

fn load_jobs(
    conn: &mut SqliteConnection,
    rows: Vec<JobRow>,
) -> Result<Vec<Job>, diesel::result::Error> {
    rows.into_iter().map(|row| load_job(conn, row)).collect()
}

#[async_trait]
impl JobRepository for DieselJobRepository {
    async fn insert(&self, job: NewJob) -> Result<Job, JobStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                conn.immediate_transaction::<_, JobStoreError, _>(|conn| {
                    if !team_leader_exists(conn, job.team_leader)? {
                        return Err(JobStoreError::UnknownTeamLeader);
                    }
                    if let Some(id) = job.id {
                        let taken: i64 = jobs::table
                            .filter(jobs::id.eq(id))
                            .count()
                            .get_result(conn)?;
                        if taken > 0 {
                            return Err(JobStoreError::DuplicateId);
                        }
                    }

                    let row = NewJobRow {
                        id: job.id,
                        team_leader: job.team_leader,
                        job: job.job,
                        work_size: job.work_size,
                        start_date: job.start_date.unwrap_or_else(|| Utc::now().naive_utc()),
                        end_date: job.end_date,
                        is_finished: job.is_finished,
                    };
                    let stored: JobRow = diesel::insert_into(jobs::table)
                        .values(row)
                        .returning(JobRow::as_returning())
                        .get_result(conn)?;

                    replace_collaborators(conn, stored.id, &job.collaborators)?;
                    replace_categories(conn, stored.id, &job.categories)?;
                    Ok(load_job(conn, stored)?)
                })
            },
            JobStoreError::connection,
        )
        .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Job>, JobStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                let row: Option<JobRow> = jobs::table
                    .filter(jobs::id.eq(id))
                    .select(JobRow::as_select())
                    .first(&mut conn)
                    .optional()?;
                match row {
                    Some(row) => Ok(Some(load_job(&mut conn, row)?)),
                    None => Ok(None),
                }
            },
            JobStoreError::connection,
        )
        .await
    }

    async fn list(&self) -> Result<Vec<Job>, JobStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                let rows: Vec<JobRow> = jobs::table
                    .order(jobs::id.asc())
                    .select(JobRow::as_select())
                    .load(&mut conn)?;
                Ok(load_jobs(&mut conn, rows)?)
            },
            JobStoreError::connection,
        )
        .await
    }

    async fn list_open_below(&self, work_size: i32) -> Result<Vec<Job>, JobStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                let rows: Vec<JobRow> = jobs::table
                    .filter(jobs::work_size.lt(work_size))
                    .filter(jobs::is_finished.eq(false))
                    .order(jobs::id.asc())
                    .select(JobRow::as_select())
                    .load(&mut conn)?;
                Ok(load_jobs(&mut conn, rows)?)
            },
            JobStoreError::connection,
        )
        .await
    }

    async fn update(&self, id: i32, patch: JobUpdate) -> Result<Job, JobStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                conn.immediate_transaction::<_, JobStoreError, _>(|conn| {
                    let existing: Option<JobRow> = jobs::table
                        .filter(jobs::id.eq(id))
                        .select(JobRow::as_select())
                        .first(conn)
                        .optional()?;
                    if existing.is_none() {
                        return Err(JobStoreError::NotFound);
                    }

                    if let Some(team_leader) = patch.team_leader {
                        if !team_leader_exists(conn, team_leader)? {
                            return Err(JobStoreError::UnknownTeamLeader);
                        }
                    }

                    let changes = JobChangeset {
                        team_leader: patch.team_leader,
                        job: patch.job,
                        work_size: patch.work_size,
                        start_date: patch.start_date,
                        end_date: patch.end_date,
                        is_finished: patch.is_finished,
                    };
                    let has_column_changes = changes.team_leader.is_some()
                        || changes.job.is_some()
                        || changes.work_size.is_some()
                        || changes.start_date.is_some()
                        || changes.end_date.is_some()
                        || changes.is_finished.is_some();
                    if has_column_changes {
                        diesel::update(jobs::table.filter(jobs::id.eq(id)))
                            .set(changes)
                            .execute(conn)?;
                    }

                    if let Some(collaborators) = &patch.collaborators {
                        replace_collaborators(conn, id, collaborators)?;
                    }
                    if let Some(names) = &patch.categories {
                        replace_categories(conn, id, names)?;
                    }

                    let row: JobRow = jobs::table
                        .filter(jobs::id.eq(id))
                        .select(JobRow::as_select())
                        .first(conn)?;
                    Ok(load_job(conn, row)?)
                })
            },
            JobStoreError::connection,
        )
        .await
    }

    async fn delete(&self, id: i32) -> Result<(), JobStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                conn.immediate_transaction::<_, JobStoreError, _>(|conn| {
                    diesel::delete(
                        job_collaborators::table.filter(job_collaborators::job_id.eq(id)),
                    )
                    .execute(conn)?;
                    diesel::delete(job_categories::table.filter(job_categories::job_id.eq(id)))
                        .execute(conn)?;
                    let removed =
                        diesel::delete(jobs::table.filter(jobs::id.eq(id))).execute(conn)?;
                    if removed == 0 {
                        return Err(JobStoreError::NotFound);
                    }
                    Ok(())
                })
            },
            JobStoreError::connection,
        )
        .await
    }
}
