//! End-to-end tests for the REST surface against a real SQLite store.
//!
//! Each test builds an isolated store file in a temp directory, applies the
//! embedded migrations, seeds the demo roster, and drives the full actix
//! app through `test::init_service`.

use actix_web::cookie::Key;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};
use tempfile::TempDir;

use backend::outbound::persistence::{
    DbPool, DieselCategoryRepository, DieselDepartmentRepository, DieselJobRepository,
    DieselUserRepository, PoolConfig, run_migrations,
};
use backend::seed::seed_if_empty;
use backend::server::{build_http_state, routes, session_middleware};

struct TestStore {
    pool: DbPool,
    _dir: TempDir,
}

fn prepare_store() -> TestStore {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("roster.db");
    let pool = PoolConfig::new(path.to_string_lossy())
        .with_max_size(2)
        .build()
        .expect("pool builds");
    run_migrations(&pool).expect("migrations apply");
    TestStore { pool, _dir: dir }
}

async fn seed(pool: &DbPool) {
    let users = DieselUserRepository::new(pool.clone());
    let jobs = DieselJobRepository::new(pool.clone());
    let departments = DieselDepartmentRepository::new(pool.clone());
    let categories = DieselCategoryRepository::new(pool.clone());
    seed_if_empty(&users, &jobs, &departments, &categories)
        .await
        .expect("seed applies");
}

macro_rules! init_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(build_http_state($pool)))
                .app_data(web::Data::new(
                    backend::inbound::http::pages::templates::build_templates()
                        .expect("templates parse"),
                ))
                .wrap(session_middleware(Key::generate(), false))
                .configure(routes),
        )
        .await
    };
}

fn new_job_body(id: i32) -> Value {
    json!({
        "id": id,
        "team_leader": 1,
        "job": "Test job via API",
        "work_size": 10,
        "collaborators": "2, 3",
        "categories": ["Research"],
    })
}

#[actix_web::test]
async fn posted_job_round_trips_with_its_category() {
    let store = prepare_store();
    seed(&store.pool).await;
    let app = init_app!(store.pool.clone());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/jobs")
            .set_json(new_job_body(999))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "success": "Job added successfully" }));

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/jobs/999").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let job = &body["job"];
    assert_eq!(job["id"], 999);
    assert_eq!(job["team_leader"], 1);
    assert_eq!(job["job"], "Test job via API");
    assert_eq!(job["work_size"], 10);
    assert_eq!(job["collaborators"], "2, 3");
    assert_eq!(job["is_finished"], false);
    assert_eq!(job["categories"], json!(["Research"]));
    assert!(job["start_date"].is_string());
    assert!(job["end_date"].is_null());
}

#[actix_web::test]
async fn duplicate_job_id_is_rejected() {
    let store = prepare_store();
    seed(&store.pool).await;
    let app = init_app!(store.pool.clone());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/jobs")
            .set_json(new_job_body(998))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/jobs")
            .set_json(new_job_body(998))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "error": "Id already exists" }));
}

#[actix_web::test]
async fn missing_job_fields_are_rejected() {
    let store = prepare_store();
    seed(&store.pool).await;
    let app = init_app!(store.pool.clone());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/jobs")
            .set_json(json!({ "id": 997 }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "error": "Missing required fields" }));
}

#[actix_web::test]
async fn non_json_bodies_answer_415() {
    let store = prepare_store();
    let app = init_app!(store.pool.clone());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/jobs")
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload("definitely not json")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[actix_web::test]
async fn deleted_job_stays_gone() {
    let store = prepare_store();
    seed(&store.pool).await;
    let app = init_app!(store.pool.clone());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/jobs")
            .set_json(new_job_body(996))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/jobs/996")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "success": "Job deleted successfully" }));

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/jobs/996").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "error": "Job not found" }));
}

#[actix_web::test]
async fn put_fully_replaces_the_category_set() {
    let store = prepare_store();
    seed(&store.pool).await;
    let app = init_app!(store.pool.clone());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/jobs")
            .set_json(new_job_body(995))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/jobs/995")
            .set_json(json!({ "categories": ["Maintenance"] }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "success": "Job updated successfully" }));

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/jobs/995").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["job"]["categories"], json!(["Maintenance"]));
}

#[actix_web::test]
async fn seeded_job_list_uses_the_envelope_shape() {
    let store = prepare_store();
    seed(&store.pool).await;
    let app = init_app!(store.pool.clone());

    let res = test::call_service(&app, test::TestRequest::get().uri("/api/jobs").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let jobs = body["jobs"].as_array().expect("jobs array");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["id"], 1);
    assert_eq!(jobs[0]["collaborators"], "2, 3");
    assert_eq!(jobs[0]["categories"], json!(["Construction"]));
}

#[actix_web::test]
async fn duplicate_email_is_rejected_on_user_create() {
    let store = prepare_store();
    seed(&store.pool).await;
    let app = init_app!(store.pool.clone());

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(json!({
                "id": 50,
                "surname": "Impostor",
                "name": "Ima",
                "age": 33,
                "position": "stowaway",
                "speciality": "hiding",
                "address": "module_3",
                "email": "scott_chief@mars.org",
                "password": "sneaky",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "error": "Email already registered" }));
}

#[actix_web::test]
async fn user_email_update_checks_only_other_users() {
    let store = prepare_store();
    seed(&store.pool).await;
    let app = init_app!(store.pool.clone());

    // Re-submitting a user's own email is not a conflict.
    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/users/2")
            .set_json(json!({ "email": "111@mars.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/users/2")
            .set_json(json!({ "email": "222@mars.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({ "error": "Email already registered by another user" })
    );
}

#[actix_web::test]
async fn user_wire_shape_excludes_credentials() {
    let store = prepare_store();
    seed(&store.pool).await;
    let app = init_app!(store.pool.clone());

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/users").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let users = body["users"].as_array().expect("users array");
    assert_eq!(users.len(), 6);
    let captain = users
        .iter()
        .find(|u| u["id"] == 1)
        .expect("captain present");
    assert_eq!(captain["email"], "scott_chief@mars.org");
    let fields = captain.as_object().expect("object");
    assert!(!fields.contains_key("hashed_password"));
    assert!(!fields.contains_key("is_admin"));
}

#[actix_web::test]
async fn deleting_a_referenced_user_is_rejected() {
    let store = prepare_store();
    seed(&store.pool).await;
    let app = init_app!(store.pool.clone());

    // Colonist 1 leads the seeded job; colonist 3 chairs the department.
    for id in [1, 3] {
        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/users/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    // Colonist 6 is referenced nowhere and may go.
    let res = test::call_service(
        &app,
        test::TestRequest::delete().uri("/api/users/6").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "success": "User deleted successfully" }));
}

#[actix_web::test]
async fn seeding_applies_only_once() {
    let store = prepare_store();
    seed(&store.pool).await;
    seed(&store.pool).await;
    let app = init_app!(store.pool.clone());

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/users").to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["users"].as_array().expect("users array").len(), 6);
}
