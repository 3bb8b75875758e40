//! Job list and job CRUD forms.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tera::Tera;

use crate::domain::{
    Category, Error, ErrorCode, JobUpdate, NewJob, format_id_list, parse_id_list,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

use super::{map_category_error, redirect_to, render_page, session_caller};

/// A job row as the index template consumes it.
#[derive(Debug, Serialize)]
struct JobRow {
    id: i32,
    team_leader_name: String,
    job: String,
    work_size: i32,
    collaborators: String,
    categories: Vec<String>,
    is_finished: bool,
    can_edit: bool,
}

#[get("/")]
pub async fn index(
    state: web::Data<HttpState>,
    tera: web::Data<Tera>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let caller = session_caller(&state, &session).await?;
    let rows: Vec<JobRow> = state
        .jobs
        .list_with_leaders()
        .await?
        .into_iter()
        .map(|listing| JobRow {
            can_edit: caller
                .as_ref()
                .is_some_and(|caller| caller.may_modify(&listing.job)),
            id: listing.job.id,
            team_leader_name: listing.team_leader_name,
            job: listing.job.job,
            work_size: listing.job.work_size,
            collaborators: format_id_list(&listing.job.collaborators),
            categories: listing.job.categories,
            is_finished: listing.job.is_finished,
        })
        .collect();

    let mut context = tera::Context::new();
    context.insert("jobs", &rows);
    render_page(&tera, &session, "index.html", &mut context)
}

/// Colonist option for the team-leader select box.
#[derive(Debug, Serialize)]
struct LeaderOption {
    id: i32,
    full_name: String,
}

async fn form_context(state: &HttpState) -> Result<tera::Context, Error> {
    let leaders: Vec<LeaderOption> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(|user| LeaderOption {
            id: user.id,
            full_name: user.full_name(),
        })
        .collect();
    let categories: Vec<String> = state
        .categories
        .list()
        .await
        .map_err(map_category_error)?
        .into_iter()
        .map(|category| category.name)
        .collect();

    let mut context = tera::Context::new();
    context.insert("users", &leaders);
    context.insert("categories", &categories);
    Ok(context)
}

/// Keep only category names that already exist. The browser surface selects
/// from the known list and never mints new categories; that is an API-only
/// behavior.
fn selected_categories(raw: &str, known: &[Category]) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| known.iter().any(|category| category.name == *name))
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct AddJobForm {
    pub team_leader_id: i32,
    pub job_description: String,
    pub work_size: i32,
    pub collaborators: String,
    /// Checkbox; present as `"on"` when ticked.
    pub is_finished: Option<String>,
    #[serde(default)]
    pub categories: String,
}

#[get("/add_job")]
pub async fn show_add_job(
    state: web::Data<HttpState>,
    tera: web::Data<Tera>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if session.user_id()?.is_none() {
        return Ok(redirect_to("/login"));
    }
    let mut context = form_context(&state).await?;
    render_page(&tera, &session, "add_job.html", &mut context)
}

#[post("/add_job")]
pub async fn submit_add_job(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<AddJobForm>,
) -> ApiResult<HttpResponse> {
    if session.user_id()?.is_none() {
        return Ok(redirect_to("/login"));
    }
    let form = form.into_inner();

    let collaborators = match parse_id_list(&form.collaborators) {
        Ok(ids) => ids,
        Err(error) => {
            session.flash(error.message())?;
            return Ok(redirect_to("/add_job"));
        }
    };
    let known = state.categories.list().await.map_err(map_category_error)?;
    let input = NewJob {
        id: None,
        team_leader: form.team_leader_id,
        job: form.job_description,
        work_size: form.work_size,
        collaborators,
        start_date: None,
        end_date: None,
        is_finished: form.is_finished.is_some(),
        categories: selected_categories(&form.categories, &known),
    };

    match state.jobs.create(input).await {
        Ok(_) => Ok(redirect_to("/")),
        Err(error)
            if matches!(
                error.code(),
                ErrorCode::InvalidRequest | ErrorCode::Conflict
            ) =>
        {
            session.flash(error.message())?;
            Ok(redirect_to("/add_job"))
        }
        Err(error) => Err(error),
    }
}

#[derive(Debug, Deserialize)]
pub struct EditJobForm {
    pub job_description: String,
    pub work_size: i32,
    pub collaborators: String,
    pub is_finished: Option<String>,
    #[serde(default)]
    pub categories: String,
}

#[get("/edit_job/{id}")]
pub async fn show_edit_job(
    state: web::Data<HttpState>,
    tera: web::Data<Tera>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let Some(caller) = session_caller(&state, &session).await? else {
        return Ok(redirect_to("/login"));
    };
    let job = match state.jobs.check_may_modify(&caller, path.into_inner()).await {
        Ok(job) => job,
        Err(error) if error.code() == ErrorCode::Forbidden => {
            session.flash(error.message())?;
            return Ok(redirect_to("/"));
        }
        Err(error) => return Err(error),
    };

    let mut context = form_context(&state).await?;
    context.insert("job_id", &job.id);
    context.insert("job_description", &job.job);
    context.insert("work_size", &job.work_size);
    context.insert("collaborators", &format_id_list(&job.collaborators));
    context.insert("is_finished", &job.is_finished);
    context.insert("job_categories", &job.categories.join(", "));
    render_page(&tera, &session, "edit_job.html", &mut context)
}

#[post("/edit_job/{id}")]
pub async fn submit_edit_job(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    form: web::Form<EditJobForm>,
) -> ApiResult<HttpResponse> {
    let Some(caller) = session_caller(&state, &session).await? else {
        return Ok(redirect_to("/login"));
    };
    let job_id = path.into_inner();
    let form = form.into_inner();

    let collaborators = match parse_id_list(&form.collaborators) {
        Ok(ids) => ids,
        Err(error) => {
            session.flash(error.message())?;
            return Ok(redirect_to(&format!("/edit_job/{job_id}")));
        }
    };
    let known = state.categories.list().await.map_err(map_category_error)?;
    let patch = JobUpdate {
        job: Some(form.job_description),
        work_size: Some(form.work_size),
        collaborators: Some(collaborators),
        is_finished: Some(form.is_finished.is_some()),
        categories: Some(selected_categories(&form.categories, &known)),
        ..JobUpdate::default()
    };

    match state.jobs.update(&caller, job_id, patch).await {
        Ok(_) => Ok(redirect_to("/")),
        Err(error) if error.code() == ErrorCode::Forbidden => {
            session.flash(error.message())?;
            Ok(redirect_to("/"))
        }
        Err(error) if error.code() == ErrorCode::InvalidRequest => {
            session.flash(error.message())?;
            Ok(redirect_to(&format!("/edit_job/{job_id}")))
        }
        Err(error) => Err(error),
    }
}

#[get("/delete_job/{id}")]
pub async fn delete_job(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let Some(caller) = session_caller(&state, &session).await? else {
        return Ok(redirect_to("/login"));
    };
    match state.jobs.delete(&caller, path.into_inner()).await {
        Ok(()) => Ok(redirect_to("/")),
        Err(error) if error.code() == ErrorCode::Forbidden => {
            session.flash(error.message())?;
            Ok(redirect_to("/"))
        }
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn known() -> Vec<Category> {
        vec![
            Category {
                id: 1,
                name: "Construction".into(),
            },
            Category {
                id: 2,
                name: "Research".into(),
            },
        ]
    }

    #[rstest]
    #[case("Construction", vec!["Construction"])]
    #[case("Construction, Research", vec!["Construction", "Research"])]
    #[case(" Research ,", vec!["Research"])]
    #[case("Welding", vec![])]
    #[case("", vec![])]
    fn only_known_category_names_survive(#[case] raw: &str, #[case] expected: Vec<&str>) {
        assert_eq!(selected_categories(raw, &known()), expected);
    }
}
