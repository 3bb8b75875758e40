//! User management service.
//!
//! Registration, authentication, projections, partial updates, and the
//! restricted delete. Password handling stays inside this module: the
//! repository only ever sees PHC hashes.

use std::sync::Arc;

use crate::domain::ports::{UserRepository, UserStoreError};
use crate::domain::{Error, NewUser, User, UserUpdate, password};

/// Registration input. `password_confirm` is `Some` on the browser path and
/// absent on the REST path.
#[derive(Debug, Clone)]
pub struct Registration {
    pub id: Option<i32>,
    pub surname: String,
    pub name: String,
    pub age: i32,
    pub position: String,
    pub speciality: String,
    pub address: String,
    pub email: String,
    pub city_from: Option<String>,
    pub password: String,
    pub password_confirm: Option<String>,
}

/// Partial update carrying the plain password; the service hashes it before
/// the repository sees anything.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub surname: Option<String>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub position: Option<String>,
    pub speciality: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub city_from: Option<Option<String>>,
    pub password: Option<String>,
}

/// User operations over the repository port.
#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UserRepository>,
}

fn map_store_error(error: UserStoreError) -> Error {
    match error {
        UserStoreError::Connection { message } => Error::service_unavailable(message),
        UserStoreError::Query { message } => Error::internal(message),
        UserStoreError::DuplicateEmail => Error::conflict("Email already registered"),
        UserStoreError::DuplicateId => Error::conflict("Id already exists"),
        UserStoreError::NotFound => Error::not_found("User not found"),
        UserStoreError::Referenced => {
            Error::conflict("User is still referenced as a team leader or department chief")
        }
    }
}

impl UsersService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new colonist. Fails when the confirmation mismatches or
    /// the email is already taken; never stores the plain password.
    pub async fn register(&self, input: Registration) -> Result<User, Error> {
        if let Some(confirm) = &input.password_confirm {
            if *confirm != input.password {
                return Err(Error::invalid_request("Passwords do not match!"));
            }
        }
        if input.age < 0 {
            return Err(Error::invalid_request("Age must be non-negative"));
        }

        let hashed_password = password::hash_password(&input.password)?;
        let new_user = NewUser {
            id: input.id,
            surname: input.surname,
            name: input.name,
            age: input.age,
            position: input.position,
            speciality: input.speciality,
            address: input.address,
            email: input.email,
            city_from: input.city_from,
            hashed_password,
            is_admin: false,
        };
        self.users.insert(new_user).await.map_err(map_store_error)
    }

    /// Check credentials and return the matching user.
    ///
    /// An unknown email and a failed hash check produce the same error so
    /// the login form does not reveal which half was wrong.
    pub async fn authenticate(&self, email: &str, plain_password: &str) -> Result<User, Error> {
        let record = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::unauthorized("Invalid email or password"))?;

        if password::verify_password(plain_password, &record.hashed_password)? {
            Ok(record.user)
        } else {
            Err(Error::unauthorized("Invalid email or password"))
        }
    }

    pub async fn get(&self, id: i32) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    pub async fn list(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(map_store_error)
    }

    /// Residents of a module, for the roster reports.
    pub async fn residents_of(&self, address: &str) -> Result<Vec<User>, Error> {
        self.users
            .list_by_address(address)
            .await
            .map_err(map_store_error)
    }

    /// Colonists younger than the threshold, for the roster reports.
    pub async fn younger_than(&self, age: i32) -> Result<Vec<User>, Error> {
        self.users
            .list_younger_than(age)
            .await
            .map_err(map_store_error)
    }

    /// Apply a partial update. An email change is re-validated against all
    /// other users; a supplied password is re-hashed.
    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<User, Error> {
        if let Some(age) = changes.age {
            if age < 0 {
                return Err(Error::invalid_request("Age must be non-negative"));
            }
        }
        let hashed_password = match &changes.password {
            Some(plain) => Some(password::hash_password(plain)?),
            None => None,
        };
        let patch = UserUpdate {
            surname: changes.surname,
            name: changes.name,
            age: changes.age,
            position: changes.position,
            speciality: changes.speciality,
            address: changes.address,
            email: changes.email,
            city_from: changes.city_from,
            hashed_password,
        };
        self.users
            .update(id, patch)
            .await
            .map_err(|error| match error {
                UserStoreError::DuplicateEmail => {
                    Error::conflict("Email already registered by another user")
                }
                other => map_store_error(other),
            })
    }

    pub async fn delete(&self, id: i32) -> Result<(), Error> {
        self.users.delete(id).await.map_err(map_store_error)
    }
}

#[cfg(test)]
mod tests {
    //! Service behavior against an in-memory stub repository.
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;
    use crate::domain::{CredentialRecord, ErrorCode};

    #[derive(Default)]
    struct StubState {
        users: Vec<(User, String)>,
        next_id: i32,
        fail_with: Option<UserStoreError>,
    }

    #[derive(Default)]
    struct StubUserRepository {
        state: Mutex<StubState>,
    }

    impl StubUserRepository {
        fn failing(error: UserStoreError) -> Self {
            Self {
                state: Mutex::new(StubState {
                    fail_with: Some(error),
                    ..StubState::default()
                }),
            }
        }
    }

    fn stamp() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .expect("valid date")
            .and_hms_opt(0, 0, 0)
            .expect("valid time")
    }

    #[async_trait]
    impl UserRepository for StubUserRepository {
        async fn insert(&self, user: NewUser) -> Result<User, UserStoreError> {
            let mut state = self.state.lock().expect("state lock");
            if let Some(error) = &state.fail_with {
                return Err(error.clone());
            }
            if state.users.iter().any(|(u, _)| u.email == user.email) {
                return Err(UserStoreError::DuplicateEmail);
            }
            if let Some(id) = user.id {
                if state.users.iter().any(|(u, _)| u.id == id) {
                    return Err(UserStoreError::DuplicateId);
                }
            }
            state.next_id += 1;
            let id = user.id.unwrap_or(state.next_id);
            let stored = User {
                id,
                surname: user.surname,
                name: user.name,
                age: user.age,
                position: user.position,
                speciality: user.speciality,
                address: user.address,
                email: user.email,
                city_from: user.city_from,
                is_admin: user.is_admin,
                modified_date: stamp(),
            };
            state.users.push((stored.clone(), user.hashed_password));
            Ok(stored)
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserStoreError> {
            let state = self.state.lock().expect("state lock");
            Ok(state.users.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
        }

        async fn find_by_email(
            &self,
            email: &str,
        ) -> Result<Option<CredentialRecord>, UserStoreError> {
            let state = self.state.lock().expect("state lock");
            Ok(state
                .users
                .iter()
                .find(|(u, _)| u.email == email)
                .map(|(u, hash)| CredentialRecord {
                    user: u.clone(),
                    hashed_password: hash.clone(),
                }))
        }

        async fn list(&self) -> Result<Vec<User>, UserStoreError> {
            let state = self.state.lock().expect("state lock");
            Ok(state.users.iter().map(|(u, _)| u.clone()).collect())
        }

        async fn list_by_address(&self, address: &str) -> Result<Vec<User>, UserStoreError> {
            let state = self.state.lock().expect("state lock");
            Ok(state
                .users
                .iter()
                .filter(|(u, _)| u.address == address)
                .map(|(u, _)| u.clone())
                .collect())
        }

        async fn list_younger_than(&self, age: i32) -> Result<Vec<User>, UserStoreError> {
            let state = self.state.lock().expect("state lock");
            Ok(state
                .users
                .iter()
                .filter(|(u, _)| u.age < age)
                .map(|(u, _)| u.clone())
                .collect())
        }

        async fn update(&self, id: i32, patch: UserUpdate) -> Result<User, UserStoreError> {
            let mut state = self.state.lock().expect("state lock");
            if let Some(email) = &patch.email {
                if state.users.iter().any(|(u, _)| u.email == *email && u.id != id) {
                    return Err(UserStoreError::DuplicateEmail);
                }
            }
            let entry = state
                .users
                .iter_mut()
                .find(|(u, _)| u.id == id)
                .ok_or(UserStoreError::NotFound)?;
            if let Some(surname) = patch.surname {
                entry.0.surname = surname;
            }
            if let Some(email) = patch.email {
                entry.0.email = email;
            }
            if let Some(city_from) = patch.city_from {
                entry.0.city_from = city_from;
            }
            if let Some(hash) = patch.hashed_password {
                entry.1 = hash;
            }
            Ok(entry.0.clone())
        }

        async fn delete(&self, id: i32) -> Result<(), UserStoreError> {
            let mut state = self.state.lock().expect("state lock");
            if let Some(error) = &state.fail_with {
                return Err(error.clone());
            }
            let before = state.users.len();
            state.users.retain(|(u, _)| u.id != id);
            if state.users.len() == before {
                return Err(UserStoreError::NotFound);
            }
            Ok(())
        }

        async fn count(&self) -> Result<i64, UserStoreError> {
            let state = self.state.lock().expect("state lock");
            Ok(state.users.len() as i64)
        }
    }

    fn registration(email: &str) -> Registration {
        Registration {
            id: None,
            surname: "Scott".into(),
            name: "Ridley".into(),
            age: 21,
            position: "captain".into(),
            speciality: "research engineer".into(),
            address: "module_1".into(),
            email: email.into(),
            city_from: Some("London".into()),
            password: "hash123".into(),
            password_confirm: Some("hash123".into()),
        }
    }

    fn service() -> UsersService {
        UsersService::new(Arc::new(StubUserRepository::default()))
    }

    #[tokio::test]
    async fn register_hashes_the_password_and_authenticates() {
        let service = service();
        let created = service
            .register(registration("scott@mars.org"))
            .await
            .expect("registration succeeds");
        assert_eq!(created.full_name(), "Scott Ridley");

        let user = service
            .authenticate("scott@mars.org", "hash123")
            .await
            .expect("credentials accepted");
        assert_eq!(user.id, created.id);

        let err = service
            .authenticate("scott@mars.org", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn register_rejects_mismatched_confirmation() {
        let mut input = registration("scott@mars.org");
        input.password_confirm = Some("different".into());
        let err = service().register(input).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Passwords do not match!");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict_on_either_path() {
        let service = service();
        service
            .register(registration("taken@mars.org"))
            .await
            .expect("first registration succeeds");

        // Second create through the REST-style path (no confirmation).
        let mut rest_input = registration("taken@mars.org");
        rest_input.password_confirm = None;
        let err = service.register(rest_input).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), "Email already registered");
    }

    #[tokio::test]
    async fn update_maps_email_conflict_to_the_other_user_message() {
        let service = service();
        service
            .register(registration("first@mars.org"))
            .await
            .expect("registration succeeds");
        let second = service
            .register(registration("second@mars.org"))
            .await
            .expect("registration succeeds");

        let err = service
            .update(
                second.id,
                UserChanges {
                    email: Some("first@mars.org".into()),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), "Email already registered by another user");
    }

    #[tokio::test]
    async fn update_rehashes_a_supplied_password() {
        let service = service();
        let user = service
            .register(registration("scott@mars.org"))
            .await
            .expect("registration succeeds");

        service
            .update(
                user.id,
                UserChanges {
                    password: Some("new-secret".into()),
                    ..UserChanges::default()
                },
            )
            .await
            .expect("update succeeds");

        service
            .authenticate("scott@mars.org", "new-secret")
            .await
            .expect("new password accepted");
    }

    #[tokio::test]
    async fn explicit_clear_of_city_from_is_honored() {
        let service = service();
        let user = service
            .register(registration("scott@mars.org"))
            .await
            .expect("registration succeeds");
        let updated = service
            .update(
                user.id,
                UserChanges {
                    city_from: Some(None),
                    ..UserChanges::default()
                },
            )
            .await
            .expect("update succeeds");
        assert_eq!(updated.city_from, None);
    }

    #[tokio::test]
    async fn roster_reports_filter_by_module_and_age() {
        let service = service();
        let mut first = registration("first@mars.org");
        first.address = "module_1".into();
        first.age = 17;
        service.register(first).await.expect("registration succeeds");
        let mut second = registration("second@mars.org");
        second.address = "module_2".into();
        second.age = 30;
        service.register(second).await.expect("registration succeeds");

        let residents = service.residents_of("module_1").await.expect("list succeeds");
        assert_eq!(residents.len(), 1);
        assert_eq!(residents[0].email, "first@mars.org");

        let minors = service.younger_than(18).await.expect("list succeeds");
        assert_eq!(minors.len(), 1);
        assert_eq!(minors[0].age, 17);
    }

    #[tokio::test]
    async fn delete_of_referenced_user_is_restricted() {
        let repo = StubUserRepository::failing(UserStoreError::Referenced);
        let service = UsersService::new(Arc::new(repo));
        let err = service.delete(1).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case(UserStoreError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(UserStoreError::query("broken"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn store_failures_map_to_transport_codes(
        #[case] store_error: UserStoreError,
        #[case] expected: ErrorCode,
    ) {
        let service = UsersService::new(Arc::new(StubUserRepository::failing(store_error)));
        let err = service.register(registration("x@mars.org")).await.unwrap_err();
        assert_eq!(err.code(), expected);
    }
}
