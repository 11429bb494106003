//! Job store backed by a hosted PostgREST database (the `/rest/v1` API of a
//! managed Postgres service).

use super::models::{Job, JobsPage, NewJob};
use super::schema::JOBS_TABLE_NAME;
use super::store::{JobStore, JobStoreError};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header::CONTENT_RANGE, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

pub struct RestJobStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestJobStore {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("jobboard-server/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, JOBS_TABLE_NAME)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn rejected(response: Response) -> JobStoreError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        JobStoreError::Rejected { status, message }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, JobStoreError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| JobStoreError::Decode(e.to_string()))
    }
}

/// Extracts the collection size from a `Content-Range` value such as
/// `0-9/120` or `*/120`. An unknown size (`0-9/*`) yields None.
fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.parse().ok()
}

fn content_range_total(response: &Response) -> Result<u64, JobStoreError> {
    response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range_total)
        .ok_or_else(|| JobStoreError::Decode("missing or invalid Content-Range header".into()))
}

#[async_trait]
impl JobStore for RestJobStore {
    async fn list_jobs(&self, offset: u64, limit: u64) -> Result<JobsPage, JobStoreError> {
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .query(&[("offset", offset), ("limit", limit)])
            .header("Prefer", "count=exact");
        let response = self.authorized(request).send().await?;

        // Asking for a window past the end is answered with 416 and the
        // real size in Content-Range, which is just an empty page for us.
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            if let Ok(total) = content_range_total(&response) {
                debug!("Requested offset {} is past the {} stored jobs", offset, total);
                return Ok(JobsPage {
                    jobs: Vec::new(),
                    total,
                });
            }
        }
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let total = content_range_total(&response)?;
        let jobs: Vec<Job> = Self::decode(response).await?;
        Ok(JobsPage { jobs, total })
    }

    async fn insert_job(&self, job: NewJob) -> Result<Job, JobStoreError> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&[job]);
        let response = self.authorized(request).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejected(response).await);
        }

        let rows: Vec<Job> = Self::decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| JobStoreError::Decode("insert returned no representation".into()))
    }
}
