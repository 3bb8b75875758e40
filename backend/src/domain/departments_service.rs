//! Department management service.
//!
//! Departments have no ownership rule: any authenticated colonist may edit
//! any department. The adapters enforce "is authenticated"; this service
//! enforces the data invariants (unique email, existing chief).

use std::sync::Arc;

use crate::domain::ports::{DepartmentRepository, DepartmentStoreError};
use crate::domain::{Department, Error, NewDepartment};

/// Department operations over the repository port.
#[derive(Clone)]
pub struct DepartmentsService {
    departments: Arc<dyn DepartmentRepository>,
}

fn map_store_error(error: DepartmentStoreError) -> Error {
    match error {
        DepartmentStoreError::Connection { message } => Error::service_unavailable(message),
        DepartmentStoreError::Query { message } => Error::internal(message),
        DepartmentStoreError::DuplicateEmail => Error::conflict("Email already registered"),
        DepartmentStoreError::NotFound => Error::not_found("Department not found"),
        DepartmentStoreError::UnknownChief => Error::invalid_request("Chief does not exist"),
    }
}

impl DepartmentsService {
    pub fn new(departments: Arc<dyn DepartmentRepository>) -> Self {
        Self { departments }
    }

    pub async fn create(&self, input: NewDepartment) -> Result<Department, Error> {
        self.departments.insert(input).await.map_err(map_store_error)
    }

    pub async fn get(&self, id: i32) -> Result<Department, Error> {
        self.departments
            .find_by_id(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("Department not found"))
    }

    pub async fn list(&self) -> Result<Vec<Department>, Error> {
        self.departments.list().await.map_err(map_store_error)
    }

    /// Whole-record replacement; the edit form submits every field.
    pub async fn update(&self, id: i32, input: NewDepartment) -> Result<Department, Error> {
        self.departments
            .update(id, input)
            .await
            .map_err(map_store_error)
    }

    pub async fn delete(&self, id: i32) -> Result<(), Error> {
        self.departments.delete(id).await.map_err(map_store_error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::ErrorCode;

    #[derive(Default)]
    struct StubState {
        departments: Vec<Department>,
        next_id: i32,
    }

    #[derive(Default)]
    struct StubDepartmentRepository {
        state: Mutex<StubState>,
    }

    #[async_trait]
    impl DepartmentRepository for StubDepartmentRepository {
        async fn insert(
            &self,
            department: NewDepartment,
        ) -> Result<Department, DepartmentStoreError> {
            let mut state = self.state.lock().expect("state lock");
            if state.departments.iter().any(|d| d.email == department.email) {
                return Err(DepartmentStoreError::DuplicateEmail);
            }
            if department.chief > 100 {
                return Err(DepartmentStoreError::UnknownChief);
            }
            state.next_id += 1;
            let stored = Department {
                id: state.next_id,
                title: department.title,
                chief: department.chief,
                members: department.members,
                email: department.email,
            };
            state.departments.push(stored.clone());
            Ok(stored)
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<Department>, DepartmentStoreError> {
            let state = self.state.lock().expect("state lock");
            Ok(state.departments.iter().find(|d| d.id == id).cloned())
        }

        async fn list(&self) -> Result<Vec<Department>, DepartmentStoreError> {
            let state = self.state.lock().expect("state lock");
            Ok(state.departments.clone())
        }

        async fn update(
            &self,
            id: i32,
            department: NewDepartment,
        ) -> Result<Department, DepartmentStoreError> {
            let mut state = self.state.lock().expect("state lock");
            if state
                .departments
                .iter()
                .any(|d| d.email == department.email && d.id != id)
            {
                return Err(DepartmentStoreError::DuplicateEmail);
            }
            let entry = state
                .departments
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or(DepartmentStoreError::NotFound)?;
            entry.title = department.title;
            entry.chief = department.chief;
            entry.members = department.members;
            entry.email = department.email;
            Ok(entry.clone())
        }

        async fn delete(&self, id: i32) -> Result<(), DepartmentStoreError> {
            let mut state = self.state.lock().expect("state lock");
            let before = state.departments.len();
            state.departments.retain(|d| d.id != id);
            if state.departments.len() == before {
                return Err(DepartmentStoreError::NotFound);
            }
            Ok(())
        }
    }

    fn geology() -> NewDepartment {
        NewDepartment {
            title: "Geological Survey".into(),
            chief: 3,
            members: vec![2, 3, 5],
            email: "geology@mars.org".into(),
        }
    }

    fn service() -> DepartmentsService {
        DepartmentsService::new(Arc::new(StubDepartmentRepository::default()))
    }

    #[tokio::test]
    async fn create_then_update_replaces_every_field() {
        let service = service();
        let created = service.create(geology()).await.expect("create succeeds");

        let mut replacement = geology();
        replacement.title = "Hydrology Survey".into();
        replacement.email = "hydrology@mars.org".into();
        replacement.members = vec![4];
        let updated = service
            .update(created.id, replacement)
            .await
            .expect("update succeeds");
        assert_eq!(updated.title, "Hydrology Survey");
        assert_eq!(updated.members, vec![4]);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let service = service();
        service.create(geology()).await.expect("create succeeds");
        let mut second = geology();
        second.title = "Second Survey".into();
        let err = service.create(second).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn unknown_chief_is_rejected() {
        let mut input = geology();
        input.chief = 999;
        let err = service().create(input).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn missing_department_maps_to_not_found() {
        let err = service().delete(41).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "Department not found");
    }
}
