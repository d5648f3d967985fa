//! HTTP Client Configuration
//!
//! Settings for the reqwest client that backs [`crate::api::OneCApiClient`].

use crate::config::credentials::Credentials;
use crate::error::RequestError;
use std::time::Duration;

/// Default request timeout, matching the 30 s used by the reference JS client
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent sent with every request
pub const USER_AGENT: &str = concat!("onec-api-client/", env!("CARGO_PKG_VERSION"));

/// Client configuration
///
/// ## Environment Variables
///
/// - `ONEC_API_BASE_URL`: API base URL including the version prefix
///   (default: https://api.1c-project.example.com/v1)
/// - `ONEC_API_TOKEN`: JWT bearer token (required)
/// - `ONEC_API_TIMEOUT_SECS`: per-request timeout in seconds (default: 30)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,

    /// Per-request timeout. Applies to HTTP calls only, not to the update stream.
    pub timeout: Duration,

    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load client configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if `ONEC_API_TOKEN` is not set or invalid values provided
    pub fn from_env() -> Result<Self, RequestError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, RequestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(&lookup)?;

        let timeout = match lookup("ONEC_API_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    RequestError::Config(format!("ONEC_API_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                if secs == 0 {
                    return Err(RequestError::Config(
                        "ONEC_API_TIMEOUT_SECS must be at least 1".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self::new(credentials).with_timeout(timeout))
    }
}
