pub mod config;
mod error;
mod http_layers;
mod jobs_endpoint;
pub mod metrics;
mod pagination;
mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use http_layers::*;
pub use jobs_endpoint::{CreateJobResponse, ListJobsResponse, INTERNAL_KEY_HEADER, JOBS_PATH};
pub use pagination::Pagination;
pub use server::{make_app, run_server};
