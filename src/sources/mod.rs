//! Popularity metric collectors
//!
//! Each source turns a tool's listing URL into one raw count. Sources only
//! fetch numbers; scoring happens in [`crate::scoring`].
//!
//! # Environment Variables
//!
//! - `GITHUB_TOKEN`: optional, raises the GitHub rate limit
//! - `PRODUCTHUNT_API_TOKEN`: required by the Product Hunt source

mod github;
mod product_hunt;

pub use github::{parse_github_url, GitHubRepo, GitHubSource};
pub use product_hunt::{parse_product_hunt_url, ProductHuntSource};

use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while fetching a metric
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Missing API token: {env_var} not set")]
    MissingToken { env_var: String },

    #[error("Unrecognized URL: {0}")]
    InvalidUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited by {0}; set a token to raise the limit")]
    RateLimited(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

impl SourceError {
    /// Transport failures and server errors are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::RequestFailed(_) => true,
            SourceError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A collector for one popularity signal
pub trait MetricSource: Send + Sync {
    /// Name of this source (for logging and reports)
    fn name(&self) -> &str;

    /// Fetch the current count for the tool listed at `url`
    fn fetch(&self, url: &str) -> SourceResult<u64>;
}

/// Build the shared HTTP agent; status codes are handled by the callers
pub(crate) fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

/// Fetch with up to `attempts` tries, waiting `backoff × attempt` between
/// retryable failures.
pub fn fetch_with_retry(
    source: &dyn MetricSource,
    url: &str,
    attempts: u32,
    backoff: Duration,
) -> SourceResult<u64> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match source.fetch(url) {
            Ok(count) => return Ok(count),
            Err(e) if e.is_retryable() && attempt < attempts => {
                warn!(
                    "{} attempt {}/{} failed for {}: {}",
                    source.name(),
                    attempt,
                    attempts,
                    url,
                    e
                );
                std::thread::sleep(backoff * attempt);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
