//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix cookie session so handlers only deal with domain-level
//! operations: persisting the authenticated user id and the one-shot flash
//! message the browser surface shows after a redirect.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::Error;

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const FLASH_KEY: &str = "flash";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    pub fn persist_user(&self, user_id: i32) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<i32>, Error> {
        self.0
            .get::<i32>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    /// Require an authenticated user id.
    pub fn require_user_id(&self) -> Result<i32, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop the authenticated identity (logout) and any pending flash.
    pub fn clear(&self) {
        self.0.clear();
    }

    /// Queue a one-shot message shown by the next rendered page.
    pub fn flash(&self, message: impl Into<String>) -> Result<(), Error> {
        self.0
            .insert(FLASH_KEY, message.into())
            .map_err(|error| Error::internal(format!("failed to store flash: {error}")))
    }

    /// Take the pending flash message, clearing it.
    pub fn take_flash(&self) -> Result<Option<String>, Error> {
        let message = self
            .0
            .get::<String>(FLASH_KEY)
            .map_err(|error| Error::internal(format!("failed to read flash: {error}")))?;
        if message.is_some() {
            self.0.remove(FLASH_KEY);
        }
        Ok(message)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
