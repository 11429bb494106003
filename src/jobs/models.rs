use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier. Integer keys come from SQLite, the hosted
/// database may hand out either integers or text (uuid) keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Int(i64),
    Text(String),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Int(id) => write!(f, "{}", id),
            JobId::Text(id) => f.write_str(id),
        }
    }
}

/// A persisted job listing, as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
    pub apply_url: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

/// A validated job waiting to be inserted. It carries no `id` or `created_at`,
/// those belong to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    pub apply_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NewJob {
    /// Minimal job with only the required fields set.
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        apply_url: impl Into<String>,
    ) -> Self {
        NewJob {
            title: title.into(),
            company: company.into(),
            location: None,
            job_type: None,
            experience_level: None,
            salary_range: None,
            apply_url: apply_url.into(),
            source: None,
            tags: None,
        }
    }
}

/// One window of the listing plus the size of the whole collection.
#[derive(Debug, Clone, PartialEq)]
pub struct JobsPage {
    pub jobs: Vec<Job>,
    pub total: u64,
}
