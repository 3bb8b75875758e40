//! Jobs REST API handlers.
//!
//! ```text
//! GET    /api/jobs            {"jobs": [...]}
//! GET    /api/jobs/{id}       {"job": {...}}
//! POST   /api/jobs            201 {"success": "Job added successfully"}
//! PUT    /api/jobs/{id}       {"success": "Job updated successfully"}
//! DELETE /api/jobs/{id}       {"success": "Job deleted successfully"}
//! ```
//!
//! The wire shape keeps the historical contract: `collaborators` travels as
//! a comma-separated string even though storage is relational, and the API
//! runs unauthenticated, so handlers call the domain as [`Caller::System`].

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

use crate::domain::{Caller, Error, Job, JobUpdate, NewJob, format_id_list, parse_id_list};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Job representation on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobJson {
    pub id: i32,
    pub team_leader: i32,
    pub job: String,
    pub work_size: i32,
    /// Comma-separated collaborator ids, e.g. `"2, 3"`.
    pub collaborators: String,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub is_finished: bool,
    pub categories: Vec<String>,
}

impl From<Job> for JobJson {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            team_leader: job.team_leader,
            job: job.job,
            work_size: job.work_size,
            collaborators: format_id_list(&job.collaborators),
            start_date: job.start_date,
            end_date: job.end_date,
            is_finished: job.is_finished,
            categories: job.categories,
        }
    }
}

/// Create request. Every field is optional at the serde layer so we can
/// answer with the contract's own messages instead of a deserializer error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateJobRequest {
    pub id: Option<i32>,
    pub team_leader: Option<i32>,
    pub job: Option<String>,
    pub work_size: Option<i32>,
    pub collaborators: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_finished: bool,
    #[serde(default)]
    pub categories: Vec<String>,
}

fn new_job_from_request(request: CreateJobRequest) -> Result<NewJob, Error> {
    let Some(id) = request.id else {
        return Err(Error::invalid_request("Id is required"));
    };
    let (Some(team_leader), Some(job), Some(work_size), Some(collaborators)) = (
        request.team_leader,
        request.job,
        request.work_size,
        request.collaborators,
    ) else {
        return Err(Error::invalid_request("Missing required fields"));
    };
    Ok(NewJob {
        id: Some(id),
        team_leader,
        job,
        work_size,
        collaborators: parse_id_list(&collaborators)?,
        start_date: request.start_date,
        end_date: request.end_date,
        is_finished: request.is_finished,
        categories: request.categories,
    })
}

/// Distinguishes an absent key (leave unchanged) from an explicit `null`
/// (clear the value) in partial-update bodies.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update request; absent keys leave the field unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobRequest {
    pub team_leader: Option<i32>,
    pub job: Option<String>,
    pub work_size: Option<i32>,
    pub collaborators: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDateTime>>,
    pub is_finished: Option<bool>,
    pub categories: Option<Vec<String>>,
}

fn patch_from_request(request: UpdateJobRequest) -> Result<JobUpdate, Error> {
    let collaborators = match request.collaborators {
        Some(raw) => Some(parse_id_list(&raw)?),
        None => None,
    };
    Ok(JobUpdate {
        team_leader: request.team_leader,
        job: request.job,
        work_size: request.work_size,
        collaborators,
        start_date: request.start_date,
        end_date: request.end_date,
        is_finished: request.is_finished,
        categories: request.categories,
    })
}

#[get("/jobs")]
pub async fn list_jobs(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let jobs: Vec<JobJson> = state
        .jobs
        .list()
        .await?
        .into_iter()
        .map(JobJson::from)
        .collect();
    Ok(HttpResponse::Ok().json(json!({ "jobs": jobs })))
}

#[get("/jobs/{id}")]
pub async fn get_job(state: web::Data<HttpState>, path: web::Path<i32>) -> ApiResult<HttpResponse> {
    let job = state.jobs.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "job": JobJson::from(job) })))
}

#[post("/jobs")]
pub async fn add_job(
    state: web::Data<HttpState>,
    payload: web::Json<CreateJobRequest>,
) -> ApiResult<HttpResponse> {
    let input = new_job_from_request(payload.into_inner())?;
    state.jobs.create(input).await?;
    Ok(HttpResponse::Created().json(json!({ "success": "Job added successfully" })))
}

#[put("/jobs/{id}")]
pub async fn edit_job(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<UpdateJobRequest>,
) -> ApiResult<HttpResponse> {
    let patch = patch_from_request(payload.into_inner())?;
    state
        .jobs
        .update(&Caller::System, path.into_inner(), patch)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": "Job updated successfully" })))
}

#[delete("/jobs/{id}")]
pub async fn delete_job(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    state.jobs.delete(&Caller::System, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": "Job deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::ErrorCode;

    fn full_request() -> CreateJobRequest {
        CreateJobRequest {
            id: Some(999),
            team_leader: Some(1),
            job: Some("Test job via API".into()),
            work_size: Some(10),
            collaborators: Some("2, 3".into()),
            categories: vec!["Research".into()],
            ..CreateJobRequest::default()
        }
    }

    #[test]
    fn create_request_maps_to_domain_input() {
        let input = new_job_from_request(full_request()).expect("valid request");
        assert_eq!(input.id, Some(999));
        assert_eq!(input.collaborators, vec![2, 3]);
        assert_eq!(input.categories, vec!["Research".to_owned()]);
        assert!(!input.is_finished);
    }

    #[test]
    fn missing_id_has_its_own_message() {
        let mut request = full_request();
        request.id = None;
        let err = new_job_from_request(request).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Id is required");
    }

    #[rstest]
    #[case::team_leader(CreateJobRequest { team_leader: None, ..full_request() })]
    #[case::job(CreateJobRequest { job: None, ..full_request() })]
    #[case::work_size(CreateJobRequest { work_size: None, ..full_request() })]
    #[case::collaborators(CreateJobRequest { collaborators: None, ..full_request() })]
    fn missing_required_fields_are_rejected(#[case] request: CreateJobRequest) {
        let err = new_job_from_request(request).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "Missing required fields");
    }

    #[test]
    fn malformed_collaborator_list_is_rejected() {
        let mut request = full_request();
        request.collaborators = Some("2, three".into());
        let err = new_job_from_request(request).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn job_json_renders_the_collaborator_string() {
        let job = Job {
            id: 1,
            team_leader: 1,
            job: "deployment of residential modules".into(),
            work_size: 15,
            collaborators: vec![2, 3],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .expect("valid date")
                .and_hms_opt(9, 30, 0)
                .expect("valid time"),
            end_date: None,
            is_finished: false,
            categories: vec!["Construction".into()],
        };
        let value = serde_json::to_value(JobJson::from(job)).expect("serializes");
        assert_eq!(value["collaborators"], "2, 3");
        assert_eq!(value["start_date"], "2024-01-01T09:30:00");
        assert_eq!(value["end_date"], Value::Null);
        assert_eq!(value["categories"], json!(["Construction"]));
    }

    #[rstest]
    #[case::absent("{}", None)]
    #[case::null(r#"{"end_date": null}"#, Some(None))]
    fn end_date_patch_distinguishes_null_from_absent(
        #[case] body: &str,
        #[case] expected: Option<Option<NaiveDateTime>>,
    ) {
        let request: UpdateJobRequest = serde_json::from_str(body).expect("valid json");
        assert_eq!(request.end_date, expected);
    }

    #[test]
    fn patch_parses_the_collaborator_string() {
        let request = UpdateJobRequest {
            collaborators: Some("5, 4, 4".into()),
            ..UpdateJobRequest::default()
        };
        let patch = patch_from_request(request).expect("valid patch");
        assert_eq!(patch.collaborators, Some(vec![4, 5]));
    }
}
