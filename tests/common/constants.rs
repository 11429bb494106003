//! Shared constants for end-to-end tests

/// Internal key the test server is configured with
pub const INTERNAL_KEY: &str = "test-internal-key";

/// Maximum time to wait for the server to accept requests
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Timeout applied to every client request
pub const REQUEST_TIMEOUT_SECS: u64 = 5;
