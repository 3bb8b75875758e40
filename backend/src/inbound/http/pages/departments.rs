//! Department list and CRUD forms.
//!
//! Departments have no ownership rule: any logged-in colonist may edit or
//! delete any department.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tera::Tera;

use crate::domain::{Error, ErrorCode, NewDepartment, format_id_list, parse_id_list};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

use super::{redirect_to, render_page};

/// A department row as the list template consumes it.
#[derive(Debug, Serialize)]
struct DepartmentRow {
    id: i32,
    title: String,
    chief_name: String,
    members: String,
    email: String,
}

#[get("/departments")]
pub async fn departments(
    state: web::Data<HttpState>,
    tera: web::Data<Tera>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let names: std::collections::HashMap<i32, String> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(|user| (user.id, user.full_name()))
        .collect();
    let rows: Vec<DepartmentRow> = state
        .departments
        .list()
        .await?
        .into_iter()
        .map(|department| DepartmentRow {
            chief_name: names
                .get(&department.chief)
                .cloned()
                .unwrap_or_else(|| format!("colonist {}", department.chief)),
            id: department.id,
            title: department.title,
            members: format_id_list(&department.members),
            email: department.email,
        })
        .collect();

    let mut context = tera::Context::new();
    context.insert("departments", &rows);
    render_page(&tera, &session, "departments.html", &mut context)
}

#[derive(Debug, Serialize)]
struct ChiefOption {
    id: i32,
    full_name: String,
}

async fn form_context(state: &HttpState) -> Result<tera::Context, Error> {
    let chiefs: Vec<ChiefOption> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(|user| ChiefOption {
            id: user.id,
            full_name: user.full_name(),
        })
        .collect();
    let mut context = tera::Context::new();
    context.insert("users", &chiefs);
    Ok(context)
}

#[derive(Debug, Deserialize)]
pub struct DepartmentForm {
    pub title: String,
    pub chief_id: i32,
    pub members: String,
    pub email: String,
}

fn department_from_form(form: DepartmentForm) -> Result<NewDepartment, Error> {
    Ok(NewDepartment {
        title: form.title,
        chief: form.chief_id,
        members: parse_id_list(&form.members)?,
        email: form.email,
    })
}

#[get("/add_department")]
pub async fn show_add_department(
    state: web::Data<HttpState>,
    tera: web::Data<Tera>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if session.user_id()?.is_none() {
        return Ok(redirect_to("/login"));
    }
    let mut context = form_context(&state).await?;
    render_page(&tera, &session, "add_department.html", &mut context)
}

#[post("/add_department")]
pub async fn submit_add_department(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<DepartmentForm>,
) -> ApiResult<HttpResponse> {
    if session.user_id()?.is_none() {
        return Ok(redirect_to("/login"));
    }
    let input = match department_from_form(form.into_inner()) {
        Ok(input) => input,
        Err(error) => {
            session.flash(error.message())?;
            return Ok(redirect_to("/add_department"));
        }
    };
    match state.departments.create(input).await {
        Ok(_) => Ok(redirect_to("/departments")),
        Err(error)
            if matches!(
                error.code(),
                ErrorCode::InvalidRequest | ErrorCode::Conflict
            ) =>
        {
            session.flash(error.message())?;
            Ok(redirect_to("/add_department"))
        }
        Err(error) => Err(error),
    }
}

#[get("/edit_department/{id}")]
pub async fn show_edit_department(
    state: web::Data<HttpState>,
    tera: web::Data<Tera>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    if session.user_id()?.is_none() {
        return Ok(redirect_to("/login"));
    }
    let department = state.departments.get(path.into_inner()).await?;

    let mut context = form_context(&state).await?;
    context.insert("department_id", &department.id);
    context.insert("title", &department.title);
    context.insert("chief", &department.chief);
    context.insert("members", &format_id_list(&department.members));
    context.insert("email", &department.email);
    render_page(&tera, &session, "edit_department.html", &mut context)
}

#[post("/edit_department/{id}")]
pub async fn submit_edit_department(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    form: web::Form<DepartmentForm>,
) -> ApiResult<HttpResponse> {
    if session.user_id()?.is_none() {
        return Ok(redirect_to("/login"));
    }
    let department_id = path.into_inner();
    let input = match department_from_form(form.into_inner()) {
        Ok(input) => input,
        Err(error) => {
            session.flash(error.message())?;
            return Ok(redirect_to(&format!("/edit_department/{department_id}")));
        }
    };
    match state.departments.update(department_id, input).await {
        Ok(_) => Ok(redirect_to("/departments")),
        Err(error)
            if matches!(
                error.code(),
                ErrorCode::InvalidRequest | ErrorCode::Conflict
            ) =>
        {
            session.flash(error.message())?;
            Ok(redirect_to(&format!("/edit_department/{department_id}")))
        }
        Err(error) => Err(error),
    }
}

#[get("/delete_department/{id}")]
pub async fn delete_department(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    if session.user_id()?.is_none() {
        return Ok(redirect_to("/login"));
    }
    state.departments.delete(path.into_inner()).await?;
    Ok(redirect_to("/departments"))
}
