//! API Credential Management
//!
//! Base URL and bearer token for the 1C API, loaded explicitly or from
//! environment variables. The token is never logged and is masked when displayed.

use crate::error::RequestError;
use reqwest::Url;
use std::fmt;

/// Default API endpoint used when `ONEC_API_BASE_URL` is not set
pub const DEFAULT_BASE_URL: &str = "https://api.1c-project.example.com/v1";

/// Secure string wrapper that masks sensitive data in logs
///
/// Debug output shows only `SecretString(***)` and Display shows the
/// truncated form `first4...last4`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: String) -> Self {
        SecretString(value)
    }

    /// Returns a reference to the inner string
    ///
    /// Only use this when building request headers. Never log the returned value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns a masked version of the secret for safe logging
    ///
    /// Format: `first4...last4` (e.g., "eyJh...XVCJ")
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "***".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        SecretString::new(s)
    }
}

/// Where and as whom the client talks to the API
///
/// Immutable once built. The raw token is kept here, next to the base URL, so
/// the stream handshake does not have to dig it back out of a header map.
#[derive(Clone, Debug)]
pub struct Credentials {
    /// Normalized base URL, scheme lowercased and without a trailing `/`
    base_url: String,
    /// JWT bearer token
    token: SecretString,
}

impl Credentials {
    /// Builds credentials from an explicit base URL and token
    ///
    /// # Errors
    /// `RequestError::Config` if the URL is not an absolute `http`/`https` URL
    /// or the token is empty after trimming.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, RequestError> {
        let base_url = normalize_base_url(base_url)?;

        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(RequestError::Config(
                "API token is empty after trimming whitespace".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            token: SecretString::new(token),
        })
    }

    /// Loads credentials from environment variables
    ///
    /// Reads `ONEC_API_BASE_URL` (default [`DEFAULT_BASE_URL`]) and
    /// `ONEC_API_TOKEN` (required).
    pub fn from_env() -> Result<Self, RequestError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, RequestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("ONEC_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let token = lookup("ONEC_API_TOKEN").ok_or_else(|| {
            RequestError::Config(
                "ONEC_API_TOKEN not set. Export the JWT issued for the 1C API:\n\
                 export ONEC_API_TOKEN=your_jwt_token_here"
                    .to_string(),
            )
        })?;

        Self::new(&base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

fn normalize_base_url(raw: &str) -> Result<String, RequestError> {
    let raw = raw.trim();
    let url = Url::parse(raw)
        .map_err(|e| RequestError::Config(format!("Invalid base URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(RequestError::Config(format!(
                "Unsupported base URL scheme '{}', expected http or https",
                other
            )))
        }
    }

    // Endpoint paths are appended to the base URL as text
    if url.query().is_some() || url.fragment().is_some() {
        return Err(RequestError::Config(format!(
            "Base URL '{}' must not carry a query or fragment",
            raw
        )));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
