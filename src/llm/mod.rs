//! Model collaborator: subprocess executor, rate limiting and response cleanup.

pub mod executor;
pub mod json;
pub mod rate_limit;

pub use executor::{CommandExecutor, DEFAULT_TIMEOUT_SECS, ModelExecutor};
pub use json::{extract_json, strip_code_fences};
pub use rate_limit::{DEFAULT_REQUESTS_PER_MINUTE, RateLimitedExecutor, RateLimiter};

#[cfg(test)]
pub use executor::MockModelExecutor;
