mod cors;
mod requests_logging;

pub use cors::{cors, ALLOWED_HEADERS, ALLOWED_METHODS};
pub use requests_logging::{log_requests, RequestsLoggingLevel};
