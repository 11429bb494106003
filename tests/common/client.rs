//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per jobs endpoint operation.

use super::constants::*;
use reqwest::{Method, Response};
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn jobs_url(&self) -> String {
        format!("{}/api/jobs", self.base_url)
    }

    /// GET /api/jobs with optional raw `page` and `limit` values
    #[allow(dead_code)]
    pub async fn list_jobs(&self, page: Option<&str>, limit: Option<&str>) -> Response {
        let mut query = vec![];
        if let Some(page) = page {
            query.push(("page", page));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit));
        }
        self.client
            .get(self.jobs_url())
            .query(&query)
            .send()
            .await
            .expect("List jobs request failed")
    }

    /// POST /api/jobs with the configured internal key
    #[allow(dead_code)]
    pub async fn create_job(&self, body: &Value) -> Response {
        self.create_job_with_key(body, Some(INTERNAL_KEY)).await
    }

    /// POST /api/jobs with an arbitrary key, or none at all
    pub async fn create_job_with_key(&self, body: &Value, key: Option<&str>) -> Response {
        let mut request = self.client.post(self.jobs_url()).json(body);
        if let Some(key) = key {
            request = request.header("x-internal-key", key);
        }
        request.send().await.expect("Create job request failed")
    }

    /// POST /api/jobs with a raw, possibly invalid, body
    #[allow(dead_code)]
    pub async fn create_job_raw(&self, body: &str) -> Response {
        self.client
            .post(self.jobs_url())
            .header("content-type", "application/json")
            .header("x-internal-key", INTERNAL_KEY)
            .body(body.to_string())
            .send()
            .await
            .expect("Create job request failed")
    }

    /// Sends any method to /api/jobs, authenticated
    #[allow(dead_code)]
    pub async fn request(&self, method: Method) -> Response {
        self.client
            .request(method, self.jobs_url())
            .header("x-internal-key", INTERNAL_KEY)
            .send()
            .await
            .expect("Request failed")
    }

    /// Creates a minimal valid job and returns the response body
    #[allow(dead_code)]
    pub async fn create_simple_job(&self, title: &str) -> Value {
        let response = self
            .create_job(&json!({
                "title": title,
                "company": "Acme",
                "apply_url": "https://acme.test/apply"
            }))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Invalid create response")
    }
}
