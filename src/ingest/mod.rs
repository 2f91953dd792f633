/// Remote-platform ingest for the scene selection service.
///
/// Submodules:
/// - `catalog` — STAC item search and imagery/cloud-probability pairing.
/// - `reduce` — per-scene metric reduction via the statistics endpoint.
///
/// Both follow the same shape: URL/request builders and response parsers are
/// pure functions testable offline; the functions that actually hit the
/// network take a `reqwest::blocking::Client` and are exercised by ignored
/// integration tests.

use std::time::Duration;

use crate::config::{PlatformConfig, TOKEN_ENV};
use crate::model::PlatformError;

pub mod catalog;
pub mod reduce;

/// Builds the blocking HTTP client used for all platform calls.
pub fn build_client(cfg: &PlatformConfig) -> Result<reqwest::blocking::Client, PlatformError> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .build()?)
}

/// Bearer token for the platform, if one is configured in the environment.
/// URL building and replay runs work without it; live calls that need it
/// will fail with the platform's own error.
pub fn auth_token() -> Option<String> {
    std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty())
}

/// Attaches the bearer token to a request when one is present.
pub(crate) fn with_auth(
    request: reqwest::blocking::RequestBuilder,
) -> reqwest::blocking::RequestBuilder {
    match auth_token() {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}
