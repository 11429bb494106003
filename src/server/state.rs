use crate::jobs::JobStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedJobStore = Arc<dyn JobStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub job_store: GuardedJobStore,
    pub hash: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, job_store: GuardedJobStore) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            job_store,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}
