//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::Server;
use actix_web::error::JsonPayloadError;
use actix_web::{App, HttpServer, web};
use tera::Tera;

use crate::domain::Error;
use crate::inbound::http::pages::templates::build_templates;
use crate::inbound::http::pages::{auth, departments, jobs, users};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{api_jobs, api_users};
use crate::middleware::Trace;
use crate::outbound::persistence::{
    DbPool, DieselCategoryRepository, DieselDepartmentRepository, DieselJobRepository,
    DieselUserRepository,
};

/// Wire the domain services to their Diesel adapters.
pub fn build_http_state(pool: DbPool) -> HttpState {
    HttpState::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselJobRepository::new(pool.clone())),
        Arc::new(DieselDepartmentRepository::new(pool.clone())),
        Arc::new(DieselCategoryRepository::new(pool)),
    )
}

/// Cookie session middleware shared by the server and the integration
/// tests.
pub fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build()
}

/// JSON extractor configuration for the API scope. A wrong `Content-Type`
/// answers 415 rather than the extractor's default 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let error = match &err {
            JsonPayloadError::ContentType => {
                Error::unsupported_media("Expected an application/json request body")
            }
            other => Error::invalid_request(format!("invalid JSON body: {other}")),
        };
        actix_web::Error::from(error)
    })
}

/// Register every route, REST and browser, on the given service config.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .service(api_jobs::list_jobs)
            .service(api_jobs::get_job)
            .service(api_jobs::add_job)
            .service(api_jobs::edit_job)
            .service(api_jobs::delete_job)
            .service(api_users::list_users)
            .service(api_users::get_user)
            .service(api_users::add_user)
            .service(api_users::edit_user)
            .service(api_users::delete_user),
    )
    .service(jobs::index)
    .service(jobs::show_add_job)
    .service(jobs::submit_add_job)
    .service(jobs::show_edit_job)
    .service(jobs::submit_edit_job)
    .service(jobs::delete_job)
    .service(auth::show_login)
    .service(auth::submit_login)
    .service(auth::logout)
    .service(auth::show_register)
    .service(auth::submit_register)
    .service(departments::departments)
    .service(departments::show_add_department)
    .service(departments::submit_add_department)
    .service(departments::show_edit_department)
    .service(departments::submit_edit_department)
    .service(departments::delete_department)
    .service(users::users_show);
}

/// Construct the HTTP server.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails or an
/// embedded template is malformed.
pub fn run(config: ServerConfig) -> std::io::Result<Server> {
    let state = web::Data::new(build_http_state(config.pool.clone()));
    let tera: web::Data<Tera> = web::Data::new(
        build_templates().map_err(|error| std::io::Error::other(error.to_string()))?,
    );
    let ServerConfig {
        key,
        cookie_secure,
        bind_addr,
        ..
    } = config;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(tera.clone())
            .wrap(session_middleware(key.clone(), cookie_secure))
            .wrap(Trace)
            .configure(routes)
    })
    .bind(bind_addr)?
    .run();
    Ok(server)
}
