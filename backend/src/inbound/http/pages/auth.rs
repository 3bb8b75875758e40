//! Login, logout, and registration pages.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use tera::Tera;

use crate::domain::{ErrorCode, Registration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

use super::{redirect_to, render_page};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[get("/login")]
pub async fn show_login(tera: web::Data<Tera>, session: SessionContext) -> ApiResult<HttpResponse> {
    render_page(&tera, &session, "login.html", &mut tera::Context::new())
}

#[post("/login")]
pub async fn submit_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    match state.users.authenticate(&form.email, &form.password).await {
        Ok(user) => {
            session.persist_user(user.id)?;
            Ok(redirect_to("/"))
        }
        Err(error) if error.code() == ErrorCode::Unauthorized => {
            session.flash(error.message())?;
            Ok(redirect_to("/login"))
        }
        Err(error) => Err(error),
    }
}

#[get("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    if session.user_id()?.is_none() {
        return Ok(redirect_to("/login"));
    }
    session.clear();
    Ok(redirect_to("/"))
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub surname: String,
    pub name: String,
    pub age: i32,
    pub position: String,
    pub speciality: String,
    pub address: String,
    pub email: String,
    pub city_from: Option<String>,
    pub password: String,
    pub password_confirm: String,
}

impl From<RegisterForm> for Registration {
    fn from(form: RegisterForm) -> Self {
        Self {
            id: None,
            surname: form.surname,
            name: form.name,
            age: form.age,
            position: form.position,
            speciality: form.speciality,
            address: form.address,
            email: form.email,
            city_from: form.city_from.filter(|city| !city.trim().is_empty()),
            password: form.password,
            password_confirm: Some(form.password_confirm),
        }
    }
}

#[get("/register")]
pub async fn show_register(
    tera: web::Data<Tera>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    render_page(&tera, &session, "register.html", &mut tera::Context::new())
}

#[post("/register")]
pub async fn submit_register(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<RegisterForm>,
) -> ApiResult<HttpResponse> {
    match state.users.register(form.into_inner().into()).await {
        Ok(_) => {
            session.flash("Registration successful. Please log in.")?;
            Ok(redirect_to("/login"))
        }
        Err(error)
            if matches!(
                error.code(),
                ErrorCode::InvalidRequest | ErrorCode::Conflict
            ) =>
        {
            session.flash(error.message())?;
            Ok(redirect_to("/register"))
        }
        Err(error) => Err(error),
    }
}
