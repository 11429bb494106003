mod models;
mod rest_job_store;
mod schema;
mod sqlite_job_store;
mod store;

pub use models::{Job, JobId, JobsPage, NewJob};
pub use rest_job_store::RestJobStore;
pub use schema::JOBS_VERSIONED_SCHEMAS;
pub use sqlite_job_store::SqliteJobStore;
pub use store::{JobStore, JobStoreError};
