//! The `/api/jobs` endpoint: public paginated listing and internal creation.

use super::metrics::record_store_operation;
use super::pagination::Pagination;
use super::state::ServerState;
use super::ApiError;
use crate::jobs::{Job, JobStoreError, NewJob};
use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{debug, error, warn};

pub const JOBS_PATH: &str = "/api/jobs";
pub const INTERNAL_KEY_HEADER: &str = "x-internal-key";

/// Largest create body that is buffered. Anything bigger fails the write.
pub const MAX_JOB_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Serialize, Deserialize, Debug)]
pub struct ListJobsResponse {
    pub success: bool,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub jobs: Vec<Job>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateJobResponse {
    pub success: bool,
    pub job: Job,
}

/// Body of a create request. Everything is optional here so that missing
/// required fields surface as a validation error rather than a decode error.
/// Caller supplied `id` and `created_at` are silently dropped.
#[derive(Deserialize, Debug, Default)]
struct CreateJobBody {
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    job_type: Option<String>,
    experience_level: Option<String>,
    salary_range: Option<String>,
    apply_url: Option<String>,
    source: Option<String>,
    tags: Option<Vec<String>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl CreateJobBody {
    fn into_new_job(self) -> Result<NewJob, ApiError> {
        let (Some(title), Some(company), Some(apply_url)) = (
            non_empty(self.title),
            non_empty(self.company),
            non_empty(self.apply_url),
        ) else {
            return Err(ApiError::MissingRequiredFields);
        };

        Ok(NewJob {
            location: self.location,
            job_type: self.job_type,
            experience_level: self.experience_level,
            salary_range: self.salary_range,
            source: self.source,
            tags: self.tags,
            ..NewJob::new(title, company, apply_url)
        })
    }
}

/// Compares the provided key against the configured one without
/// short-circuiting on the first differing byte.
fn keys_match(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn is_authorized(headers: &HeaderMap, internal_api_key: &str) -> bool {
    if internal_api_key.is_empty() {
        return false;
    }
    match headers.get(INTERNAL_KEY_HEADER) {
        Some(value) => keys_match(value.as_bytes(), internal_api_key.as_bytes()),
        None => false,
    }
}

async fn list_jobs(state: &ServerState, uri: &Uri) -> Result<Response, ApiError> {
    let query = Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(q)| q)
        .unwrap_or_default();
    let pagination = Pagination::from_query(&query);

    let start = Instant::now();
    let result = state
        .job_store
        .list_jobs(pagination.offset(), pagination.limit as u64)
        .await;
    record_store_operation("list", start.elapsed(), result.is_ok());

    let page = result.map_err(|err| {
        error!(
            "Failed to fetch jobs [{}..={}]: {}",
            pagination.offset(),
            pagination.last_index(),
            err
        );
        ApiError::FetchFailed
    })?;

    Ok(Json(ListJobsResponse {
        success: true,
        page: pagination.page,
        limit: pagination.limit,
        total: page.total,
        jobs: page.jobs,
    })
    .into_response())
}

async fn create_job(state: &ServerState, body: Body) -> Result<Response, ApiError> {
    let bytes = axum::body::to_bytes(body, MAX_JOB_BODY_BYTES)
        .await
        .map_err(|err| {
            warn!("Failed to read create job body: {}", err);
            ApiError::Internal
        })?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|err| {
        warn!("Unreadable create job body: {}", err);
        ApiError::Internal
    })?;
    if !value.is_object() {
        warn!("Create job body is not an object");
        return Err(ApiError::Internal);
    }
    let body: CreateJobBody = serde_json::from_value(value).map_err(|err| {
        warn!("Malformed create job body: {}", err);
        ApiError::Internal
    })?;

    let new_job = body.into_new_job().inspect_err(|_| {
        debug!("Rejecting job with missing required fields");
    })?;

    let start = Instant::now();
    let result: Result<Job, JobStoreError> = state.job_store.insert_job(new_job).await;
    record_store_operation("insert", start.elapsed(), result.is_ok());

    let job = result.map_err(|err| {
        error!("Failed to insert job: {}", err);
        ApiError::InsertFailed
    })?;
    debug!("Inserted job {}", job.id);

    Ok((
        StatusCode::CREATED,
        Json(CreateJobResponse { success: true, job }),
    )
        .into_response())
}

pub async fn jobs_endpoint(
    State(state): State<ServerState>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
    body: Body,
) -> Response {
    if method == Method::POST && !is_authorized(&headers, &state.config.internal_api_key) {
        warn!("Refusing unauthorized job creation");
        return ApiError::Unauthorized.into_response();
    }

    // Preflight never gets here, the cors layer answers it.
    let result = match method {
        Method::GET => list_jobs(&state, &uri).await,
        Method::POST => AssertUnwindSafe(create_job(&state, body))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                error!("Job creation panicked");
                Err(ApiError::Internal)
            }),
        _ => Err(ApiError::MethodNotAllowed),
    };

    result.unwrap_or_else(|err| err.into_response())
}
