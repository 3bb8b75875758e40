//! Row structs bridging Diesel and the domain types.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{Category, User};

use super::schema::{
    categories, department_members, departments, job_categories, job_collaborators, jobs, users,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub id: i32,
    pub surname: String,
    pub name: String,
    pub age: i32,
    pub position: String,
    pub speciality: String,
    pub address: String,
    pub email: String,
    pub city_from: Option<String>,
    pub hashed_password: String,
    pub is_admin: bool,
    pub modified_date: NaiveDateTime,
}

impl UserRow {
    /// Project to the domain user, dropping the credential.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            surname: self.surname,
            name: self.name,
            age: self.age,
            position: self.position,
            speciality: self.speciality,
            address: self.address,
            email: self.email,
            city_from: self.city_from,
            is_admin: self.is_admin,
            modified_date: self.modified_date,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    /// `None` lets SQLite assign the next id.
    pub id: Option<i32>,
    pub surname: String,
    pub name: String,
    pub age: i32,
    pub position: String,
    pub speciality: String,
    pub address: String,
    pub email: String,
    pub city_from: Option<String>,
    pub hashed_password: String,
    pub is_admin: bool,
    pub modified_date: NaiveDateTime,
}

/// Partial user update. `None` skips the column; the double option on
/// `city_from` expresses an explicit `NULL`.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChangeset {
    pub surname: Option<String>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub position: Option<String>,
    pub speciality: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub city_from: Option<Option<String>>,
    pub hashed_password: Option<String>,
    pub modified_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobRow {
    pub id: i32,
    pub team_leader: i32,
    pub job: String,
    pub work_size: i32,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub is_finished: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = jobs)]
pub struct NewJobRow {
    pub id: Option<i32>,
    pub team_leader: i32,
    pub job: String,
    pub work_size: i32,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub is_finished: bool,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = jobs)]
pub struct JobChangeset {
    pub team_leader: Option<i32>,
    pub job: Option<String>,
    pub work_size: Option<i32>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<Option<NaiveDateTime>>,
    pub is_finished: Option<bool>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = departments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DepartmentRow {
    pub id: i32,
    pub title: String,
    pub chief: i32,
    pub email: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = departments)]
pub struct NewDepartmentRow {
    pub title: String,
    pub chief: i32,
    pub email: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategoryRow {
    pub id: i32,
    pub name: String,
}

impl CategoryRow {
    pub fn into_category(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategoryRow<'a> {
    pub name: &'a str,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = job_categories)]
pub struct JobCategoryRow {
    pub job_id: i32,
    pub category_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = job_collaborators)]
pub struct JobCollaboratorRow {
    pub job_id: i32,
    pub user_id: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = department_members)]
pub struct DepartmentMemberRow {
    pub department_id: i32,
    pub user_id: i32,
}
