//! Users REST API handlers.
//!
//! ```text
//! GET    /api/users           {"users": [...]}
//! GET    /api/users/{id}      {"user": {...}}
//! POST   /api/users           201 {"success": "User added successfully"}
//! PUT    /api/users/{id}      {"success": "User updated successfully"}
//! DELETE /api/users/{id}      {"success": "User deleted successfully"}
//! ```
//!
//! The wire shape never includes the password hash, the admin flag, or the
//! modification timestamp. Passwords arrive in plain text on create/update
//! and are hashed by the domain service.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, Registration, User, UserChanges};
use crate::inbound::http::ApiResult;
use crate::inbound::http::api_jobs::double_option;
use crate::inbound::http::state::HttpState;

/// User representation on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserJson {
    pub id: i32,
    pub surname: String,
    pub name: String,
    pub age: i32,
    pub position: String,
    pub speciality: String,
    pub address: String,
    pub email: String,
    pub city_from: Option<String>,
}

impl From<User> for UserJson {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            surname: user.surname,
            name: user.name,
            age: user.age,
            position: user.position,
            speciality: user.speciality,
            address: user.address,
            email: user.email,
            city_from: user.city_from,
        }
    }
}

/// Create request. Fields are optional at the serde layer so missing keys
/// answer with the contract's message instead of a deserializer error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub id: Option<i32>,
    pub surname: Option<String>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub position: Option<String>,
    pub speciality: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub city_from: Option<String>,
    pub password: Option<String>,
}

fn registration_from_request(request: CreateUserRequest) -> Result<Registration, Error> {
    let (
        Some(id),
        Some(surname),
        Some(name),
        Some(age),
        Some(position),
        Some(speciality),
        Some(address),
        Some(email),
        Some(password),
    ) = (
        request.id,
        request.surname,
        request.name,
        request.age,
        request.position,
        request.speciality,
        request.address,
        request.email,
        request.password,
    )
    else {
        return Err(Error::invalid_request("Missing required fields"));
    };
    Ok(Registration {
        id: Some(id),
        surname,
        name,
        age,
        position,
        speciality,
        address,
        email,
        city_from: request.city_from,
        password,
        password_confirm: None,
    })
}

/// Partial update request; absent keys leave the field unchanged, an
/// explicit `"city_from": null` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub surname: Option<String>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub position: Option<String>,
    pub speciality: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub city_from: Option<Option<String>>,
    pub password: Option<String>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            surname: request.surname,
            name: request.name,
            age: request.age,
            position: request.position,
            speciality: request.speciality,
            address: request.address,
            email: request.email,
            city_from: request.city_from,
            password: request.password,
        }
    }
}

#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let users: Vec<UserJson> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(UserJson::from)
        .collect();
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let user = state.users.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": UserJson::from(user) })))
}

#[post("/users")]
pub async fn add_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let registration = registration_from_request(payload.into_inner())?;
    state.users.register(registration).await?;
    Ok(HttpResponse::Created().json(json!({ "success": "User added successfully" })))
}

#[put("/users/{id}")]
pub async fn edit_user(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    state
        .users
        .update(path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": "User updated successfully" })))
}

#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    state.users.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": "User deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::ErrorCode;

    fn full_request() -> CreateUserRequest {
        CreateUserRequest {
            id: Some(7),
            surname: Some("Weir".into()),
            name: Some("Andy".into()),
            age: Some(30),
            position: Some("botanist".into()),
            speciality: Some("potatoes".into()),
            address: Some("module_2".into()),
            email: Some("weir@mars.org".into()),
            city_from: None,
            password: Some("hash123".into()),
        }
    }

    #[test]
    fn create_request_maps_to_a_registration_without_confirmation() {
        let registration = registration_from_request(full_request()).expect("valid request");
        assert_eq!(registration.id, Some(7));
        assert_eq!(registration.email, "weir@mars.org");
        assert!(registration.password_confirm.is_none());
    }

    #[rstest]
    #[case::id(CreateUserRequest { id: None, ..full_request() })]
    #[case::surname(CreateUserRequest { surname: None, ..full_request() })]
    #[case::email(CreateUserRequest { email: None, ..full_request() })]
    #[case::password(CreateUserRequest { password: None, ..full_request() })]
    fn missing_required_fields_are_rejected(#[case] request: CreateUserRequest) {
        let err = registration_from_request(request).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Missing required fields");
    }

    #[test]
    fn user_json_never_carries_credentials_or_the_admin_flag() {
        let user = User {
            id: 1,
            surname: "Scott".into(),
            name: "Ridley".into(),
            age: 21,
            position: "captain".into(),
            speciality: "research engineer".into(),
            address: "module_1".into(),
            email: "scott_chief@mars.org".into(),
            city_from: Some("London".into()),
            is_admin: true,
            modified_date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .expect("valid date")
                .and_hms_opt(0, 0, 0)
                .expect("valid time"),
        };
        let value = serde_json::to_value(UserJson::from(user)).expect("serializes");
        let object = value.as_object().expect("object");
        assert!(!object.contains_key("is_admin"));
        assert!(!object.contains_key("hashed_password"));
        assert!(!object.contains_key("modified_date"));
        assert_eq!(value["city_from"], "London");
    }

    #[rstest]
    #[case::absent("{}", None)]
    #[case::null(r#"{"city_from": null}"#, Some(None))]
    #[case::value(r#"{"city_from": "Paris"}"#, Some(Some("Paris".to_owned())))]
    fn city_from_patch_distinguishes_null_from_absent(
        #[case] body: &str,
        #[case] expected: Option<Option<String>>,
    ) {
        let request: UpdateUserRequest = serde_json::from_str(body).expect("valid json");
        assert_eq!(request.city_from, expected);
    }

    #[test]
    fn patch_conversion_keeps_the_plain_password_for_the_service() {
        let request = UpdateUserRequest {
            password: Some("new-secret".into()),
            ..UpdateUserRequest::default()
        };
        let changes = UserChanges::from(request);
        assert_eq!(changes.password.as_deref(), Some("new-secret"));
        assert!(changes.email.is_none());
    }

    #[test]
    fn user_json_round_trips_through_serde() {
        let raw = json!({
            "id": 3,
            "surname": "Kapoor",
            "name": "Venkat",
            "age": 41,
            "position": "chief",
            "speciality": "geology",
            "address": "module_3",
            "email": "kapoor@mars.org",
            "city_from": Value::Null,
        });
        let parsed: UserJson = serde_json::from_value(raw).expect("valid json");
        assert_eq!(parsed.id, 3);
        assert_eq!(parsed.city_from, None);
    }
}
