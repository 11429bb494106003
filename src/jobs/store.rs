use super::models::{Job, JobsPage, NewJob};
use async_trait::async_trait;
use thiserror::Error;

/// Failures coming out of a job store. None of these are shown to HTTP
/// callers, they only end up in the logs.
#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Could not decode store response: {0}")]
    Decode(String),

    #[error("Store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Store connection lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Returns up to `limit` jobs starting at the zero-based `offset`, most
    /// recently created first, together with the total number of jobs.
    async fn list_jobs(&self, offset: u64, limit: u64) -> Result<JobsPage, JobStoreError>;

    /// Inserts one job and returns the stored row, including the `id` and
    /// `created_at` assigned by the store.
    async fn insert_job(&self, job: NewJob) -> Result<Job, JobStoreError>;
}
