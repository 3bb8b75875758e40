//! Browser (form-based) surface.
//!
//! Every route here is a GET (render) / POST (mutate then redirect) pair.
//! Mutating routes require a session; anonymous attempts redirect to
//! `/login`. Failures never render an error page: they queue a flash
//! message and redirect back, like classic server-rendered form apps.

pub mod auth;
pub mod departments;
pub mod jobs;
pub mod templates;
pub mod users;

use actix_web::http::header;
use actix_web::{HttpResponse, http::header::ContentType};
use tera::Tera;

use crate::domain::ports::CategoryStoreError;
use crate::domain::{Caller, Error, ErrorCode};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// 302 redirect used by every mutating page handler.
pub(crate) fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_owned()))
        .finish()
}

/// Render a template with the ambient page context: whether a user is
/// logged in and the pending one-shot flash message, if any.
pub(crate) fn render_page(
    tera: &Tera,
    session: &SessionContext,
    template: &str,
    context: &mut tera::Context,
) -> Result<HttpResponse, Error> {
    context.insert("logged_in", &session.user_id()?.is_some());
    if let Some(flash) = session.take_flash()? {
        context.insert("flash", &flash);
    }
    let body = tera
        .render(template, context)
        .map_err(|error| Error::internal(format!("template render failed: {error}")))?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}

/// Resolve the session into a domain caller. A session pointing at a
/// deleted user counts as anonymous rather than an error.
pub(crate) async fn session_caller(
    state: &HttpState,
    session: &SessionContext,
) -> Result<Option<Caller>, Error> {
    let Some(user_id) = session.user_id()? else {
        return Ok(None);
    };
    match state.users.get(user_id).await {
        Ok(user) => Ok(Some(Caller::User(user))),
        Err(error) if error.code() == ErrorCode::NotFound => Ok(None),
        Err(error) => Err(error),
    }
}

pub(crate) fn map_category_error(error: CategoryStoreError) -> Error {
    match error {
        CategoryStoreError::Connection { message } => Error::service_unavailable(message),
        CategoryStoreError::Query { message } => Error::internal(message),
    }
}
