//! SQLite-backed `DepartmentRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;

use crate::domain::ports::{DepartmentRepository, DepartmentStoreError};
use crate::domain::{Department, NewDepartment};

use super::diesel_helpers::{
    is_unique_violation, map_diesel_error, map_pool_error, run_blocking, unique_violation_target,
};
use super::models::{DepartmentMemberRow, DepartmentRow, NewDepartmentRow};
use super::pool::{DbPool, checkout};
use super::schema::{department_members, departments, users};

/// Diesel-backed implementation of the `DepartmentRepository` port.
#[derive(Clone)]
pub struct DieselDepartmentRepository {
    pool: DbPool,
}

impl DieselDepartmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<diesel::result::Error> for DepartmentStoreError {
    fn from(error: diesel::result::Error) -> Self {
        if is_unique_violation(&error) {
            return match unique_violation_target(&error).as_deref() {
                Some("departments.email") => Self::DuplicateEmail,
                _ => Self::query(error.to_string()),
            };
        }
        if matches!(error, diesel::result::Error::NotFound) {
            return Self::NotFound;
        }
        map_diesel_error(error, Self::query, Self::connection)
    }
}

fn get_connection(pool: &DbPool) -> Result<super::pool::DbConnection, DepartmentStoreError> {
    checkout(pool).map_err(|err| map_pool_error(err, DepartmentStoreError::connection))
}

fn chief_exists(conn: &mut SqliteConnection, id: i32) -> Result<bool, diesel::result::Error> {
    let count: i64 = users::table
        .filter(users::id.eq(id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

fn email_taken_by_other(
    conn: &mut SqliteConnection,
    email: &str,
    excluding: Option<i32>,
) -> Result<bool, diesel::result::Error> {
    let mut query = departments::table
        .filter(departments::email.eq(email))
        .into_boxed();
    if let Some(id) = excluding {
        query = query.filter(departments::id.ne(id));
    }
    let count: i64 = query.count().get_result(conn)?;
    Ok(count > 0)
}

fn replace_members(
    conn: &mut SqliteConnection,
    department_id: i32,
    members: &[i32],
) -> Result<(), diesel::result::Error> {
    diesel::delete(
        department_members::table.filter(department_members::department_id.eq(department_id)),
    )
    .execute(conn)?;
    let mut ids = members.to_vec();
    ids.sort_unstable();
    ids.dedup();
    let rows: Vec<DepartmentMemberRow> = ids
        .into_iter()
        .map(|user_id| DepartmentMemberRow {
            department_id,
            user_id,
        })
        .collect();
    diesel::insert_into(department_members::table)
        .values(rows)
        .execute(conn)?;
    Ok(())
}

fn load_department(
    conn: &mut SqliteConnection,
    row: DepartmentRow,
) -> Result<Department, diesel::result::Error> {
    let members: Vec<i32> = department_members::table
        .filter(department_members::department_id.eq(row.id))
        .order(department_members::user_id.asc())
        .select(department_members::user_id)
        .load(conn)?;
    Ok(Department {
        id: row.id,
        title: row.title,
        chief: row.chief,
        members,
        email: row.email,
    })
}

#[async_trait]
impl DepartmentRepository for DieselDepartmentRepository {
    async fn insert(&self, department: NewDepartment) -> Result<Department, DepartmentStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                conn.immediate_transaction::<_, DepartmentStoreError, _>(|conn| {
                    if !chief_exists(conn, department.chief)? {
                        return Err(DepartmentStoreError::UnknownChief);
                    }
                    if email_taken_by_other(conn, &department.email, None)? {
                        return Err(DepartmentStoreError::DuplicateEmail);
                    }

                    let row = NewDepartmentRow {
                        title: department.title,
                        chief: department.chief,
                        email: department.email,
                    };
                    let stored: DepartmentRow = diesel::insert_into(departments::table)
                        .values(row)
                        .returning(DepartmentRow::as_returning())
                        .get_result(conn)?;
                    replace_members(conn, stored.id, &department.members)?;
                    Ok(load_department(conn, stored)?)
                })
            },
            DepartmentStoreError::connection,
        )
        .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Department>, DepartmentStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                let row: Option<DepartmentRow> = departments::table
                    .filter(departments::id.eq(id))
                    .select(DepartmentRow::as_select())
                    .first(&mut conn)
                    .optional()?;
                match row {
                    Some(row) => Ok(Some(load_department(&mut conn, row)?)),
                    None => Ok(None),
                }
            },
            DepartmentStoreError::connection,
        )
        .await
    }

    async fn list(&self) -> Result<Vec<Department>, DepartmentStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                let rows: Vec<DepartmentRow> = departments::table
                    .order(departments::id.asc())
                    .select(DepartmentRow::as_select())
                    .load(&mut conn)?;
                rows.into_iter()
                    .map(|row| Ok(load_department(&mut conn, row)?))
                    .collect()
            },
            DepartmentStoreError::connection,
        )
        .await
    }

    async fn update(
        &self,
        id: i32,
        department: NewDepartment,
    ) -> Result<Department, DepartmentStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                conn.immediate_transaction::<_, DepartmentStoreError, _>(|conn| {
                    if !chief_exists(conn, department.chief)? {
                        return Err(DepartmentStoreError::UnknownChief);
                    }
                    if email_taken_by_other(conn, &department.email, Some(id))? {
                        return Err(DepartmentStoreError::DuplicateEmail);
                    }

                    let updated = diesel::update(departments::table.filter(departments::id.eq(id)))
                        .set((
                            departments::title.eq(&department.title),
                            departments::chief.eq(department.chief),
                            departments::email.eq(&department.email),
                        ))
                        .execute(conn)?;
                    if updated == 0 {
                        return Err(DepartmentStoreError::NotFound);
                    }
                    replace_members(conn, id, &department.members)?;

                    let row: DepartmentRow = departments::table
                        .filter(departments::id.eq(id))
                        .select(DepartmentRow::as_select())
                        .first(conn)?;
                    Ok(load_department(conn, row)?)
                })
            },
            DepartmentStoreError::connection,
        )
        .await
    }

    async fn delete(&self, id: i32) -> Result<(), DepartmentStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                conn.immediate_transaction::<_, DepartmentStoreError, _>(|conn| {
                    diesel::delete(
                        department_members::table
                            .filter(department_members::department_id.eq(id)),
                    )
                    .execute(conn)?;
                    let removed =
                        diesel::delete(departments::table.filter(departments::id.eq(id)))
                            .execute(conn)?;
                    if removed == 0 {
                        return Err(DepartmentStoreError::NotFound);
                    }
                    Ok(())
                })
            },
            DepartmentStoreError::connection,
        )
        .await
    }
}
