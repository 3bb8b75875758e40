//! SQLite-backed `UserRepository` implementation using Diesel.
//!
//! Every operation checks out one pooled connection and wraps its work in a
//! single transaction, so multi-step mutations (uniqueness check plus
//! insert, reference check plus delete) never apply partially.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use crate::domain::ports::{UserRepository, UserStoreError};
use crate::domain::{CredentialRecord, NewUser, User, UserUpdate};

use super::diesel_helpers::{
    is_unique_violation, map_diesel_error, map_pool_error, run_blocking, unique_violation_target,
};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, checkout};
use super::schema::{department_members, departments, job_collaborators, jobs, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<diesel::result::Error> for UserStoreError {
    fn from(error: diesel::result::Error) -> Self {
        if is_unique_violation(&error) {
            return match unique_violation_target(&error).as_deref() {
                Some("users.email") => Self::DuplicateEmail,
                Some("users.id") => Self::DuplicateId,
                _ => Self::query(error.to_string()),
            };
        }
        if matches!(error, diesel::result::Error::NotFound) {
            return Self::NotFound;
        }
        map_diesel_error(error, Self::query, Self::connection)
    }
}

fn get_connection(
    pool: &DbPool,
) -> Result<super::pool::DbConnection, UserStoreError> {
    checkout(pool).map_err(|err| map_pool_error(err, UserStoreError::connection))
}

fn row_to_credential(row: UserRow) -> CredentialRecord {
    CredentialRecord {
        hashed_password: row.hashed_password.clone(),
        user: row.into_user(),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, UserStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                conn.immediate_transaction::<_, UserStoreError, _>(|conn| {
                    if let Some(id) = user.id {
                        let taken: i64 = users::table
                            .filter(users::id.eq(id))
                            .count()
                            .get_result(conn)?;
                        if taken > 0 {
                            return Err(UserStoreError::DuplicateId);
                        }
                    }
                    let email_taken: i64 = users::table
                        .filter(users::email.eq(&user.email))
                        .count()
                        .get_result(conn)?;
                    if email_taken > 0 {
                        return Err(UserStoreError::DuplicateEmail);
                    }

                    let row = NewUserRow {
                        id: user.id,
                        surname: user.surname,
                        name: user.name,
                        age: user.age,
                        position: user.position,
                        speciality: user.speciality,
                        address: user.address,
                        email: user.email,
                        city_from: user.city_from,
                        hashed_password: user.hashed_password,
                        is_admin: user.is_admin,
                        modified_date: Utc::now().naive_utc(),
                    };
                    let stored: UserRow = diesel::insert_into(users::table)
                        .values(row)
                        .returning(UserRow::as_returning())
                        .get_result(conn)?;
                    Ok(stored.into_user())
                })
            },
            UserStoreError::connection,
        )
        .await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                let row: Option<UserRow> = users::table
                    .filter(users::id.eq(id))
                    .select(UserRow::as_select())
                    .first(&mut conn)
                    .optional()?;
                Ok(row.map(UserRow::into_user))
            },
            UserStoreError::connection,
        )
        .await
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, UserStoreError> {
        let pool = self.pool.clone();
        let email = email.to_owned();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                let row: Option<UserRow> = users::table
                    .filter(users::email.eq(&email))
                    .select(UserRow::as_select())
                    .first(&mut conn)
                    .optional()?;
                Ok(row.map(row_to_credential))
            },
            UserStoreError::connection,
        )
        .await
    }

    async fn list(&self) -> Result<Vec<User>, UserStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                let rows: Vec<UserRow> = users::table
                    .order(users::id.asc())
                    .select(UserRow::as_select())
                    .load(&mut conn)?;
                Ok(rows.into_iter().map(UserRow::into_user).collect())
            },
            UserStoreError::connection,
        )
        .await
    }

    async fn list_by_address(&self, address: &str) -> Result<Vec<User>, UserStoreError> {
        let pool = self.pool.clone();
        let address = address.to_owned();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                let rows: Vec<UserRow> = users::table
                    .filter(users::address.eq(&address))
                    .order(users::id.asc())
                    .select(UserRow::as_select())
                    .load(&mut conn)?;
                Ok(rows.into_iter().map(UserRow::into_user).collect())
            },
            UserStoreError::connection,
        )
        .await
    }

    async fn list_younger_than(&self, age: i32) -> Result<Vec<User>, UserStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                let rows: Vec<UserRow> = users::table
                    .filter(users::age.lt(age))
                    .order(users::id.asc())
                    .select(UserRow::as_select())
                    .load(&mut conn)?;
                Ok(rows.into_iter().map(UserRow::into_user).collect())
            },
            UserStoreError::connection,
        )
        .await
    }

    async fn update(&self, id: i32, patch: UserUpdate) -> Result<User, UserStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                conn.immediate_transaction::<_, UserStoreError, _>(|conn| {
                    if let Some(email) = &patch.email {
                        let taken_by_other: i64 = users::table
                            .filter(users::email.eq(email))
                            .filter(users::id.ne(id))
                            .count()
                            .get_result(conn)?;
                        if taken_by_other > 0 {
                            return Err(UserStoreError::DuplicateEmail);
                        }
                    }

                    let changes = UserChangeset {
                        surname: patch.surname,
                        name: patch.name,
                        age: patch.age,
                        position: patch.position,
                        speciality: patch.speciality,
                        address: patch.address,
                        email: patch.email,
                        city_from: patch.city_from,
                        hashed_password: patch.hashed_password,
                        modified_date: Some(Utc::now().naive_utc()),
                    };
                    let stored: UserRow = diesel::update(users::table.filter(users::id.eq(id)))
                        .set(changes)
                        .returning(UserRow::as_returning())
                        .get_result(conn)?;
                    Ok(stored.into_user())
                })
            },
            UserStoreError::connection,
        )
        .await
    }

    async fn delete(&self, id: i32) -> Result<(), UserStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                conn.immediate_transaction::<_, UserStoreError, _>(|conn| {
                    let leading: i64 = jobs::table
                        .filter(jobs::team_leader.eq(id))
                        .count()
                        .get_result(conn)?;
                    let chairing: i64 = departments::table
                        .filter(departments::chief.eq(id))
                        .count()
                        .get_result(conn)?;
                    if leading > 0 || chairing > 0 {
                        return Err(UserStoreError::Referenced);
                    }

                    // Drop unvalidated memberships silently.
                    diesel::delete(
                        job_collaborators::table.filter(job_collaborators::user_id.eq(id)),
                    )
                    .execute(conn)?;
                    diesel::delete(
                        department_members::table.filter(department_members::user_id.eq(id)),
                    )
                    .execute(conn)?;

                    let removed =
                        diesel::delete(users::table.filter(users::id.eq(id))).execute(conn)?;
                    if removed == 0 {
                        return Err(UserStoreError::NotFound);
                    }
                    Ok(())
                })
            },
            UserStoreError::connection,
        )
        .await
    }

    async fn count(&self) -> Result<i64, UserStoreError> {
        let pool = self.pool.clone();
        run_blocking(
            move || {
                let mut conn = get_connection(&pool)?;
                Ok(users::table.count().get_result(&mut conn)?)
            },
            UserStoreError::connection,
        )
        .await
    }
}
