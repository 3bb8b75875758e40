//! Colonist data model.

use chrono::NaiveDateTime;

/// A registered colonist.
///
/// The password hash deliberately lives outside this type (see
/// [`CredentialRecord`]) so read projections can never leak it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub surname: String,
    pub name: String,
    pub age: i32,
    pub position: String,
    pub speciality: String,
    /// Coarse location tag, e.g. `module_1`.
    pub address: String,
    pub email: String,
    pub city_from: Option<String>,
    /// Elevated role with override rights on job mutations.
    pub is_admin: bool,
    pub modified_date: NaiveDateTime,
}

impl User {
    /// Display name: surname followed by given name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.surname, self.name)
    }
}

/// A user together with its stored credential, for authentication only.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub user: User,
    pub hashed_password: String,
}

/// Input for creating a user. The password is already hashed by the service.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Explicit identity to honor, or `None` for a store-generated id.
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
}

/// Partial update: absent fields stay unchanged; for the nullable
/// `city_from`, `Some(None)` is an explicit clear.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub surname: Option<String>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub position: Option<String>,
    pub speciality: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub city_from: Option<Option<String>>,
    pub hashed_password: Option<String>,
}

impl UserUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.surname.is_none()
            && self.name.is_none()
            && self.age.is_none()
            && self.position.is_none()
            && self.speciality.is_none()
            && self.address.is_none()
            && self.email.is_none()
            && self.city_from.is_none()
            && self.hashed_password.is_none()
    }
}
