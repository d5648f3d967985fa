use reqwest::StatusCode;
use thiserror::Error;

/// Error raised by request-style client operations
///
/// Only transport-level problems end up here. A 2xx response whose envelope
/// carries `success: false` is returned to the caller as data, not as an error.
#[derive(Error, Debug)]
pub enum RequestError {
    /// The server answered with a non-2xx status
    #[error("API Error {status}: {message}")]
    Status {
        status: StatusCode,
        url: String,
        /// `error.code` from the response body, when the body had one
        code: Option<String>,
        message: String,
    },

    /// No response was received (connection refused, DNS, timeout...)
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// A 2xx response whose body is not the expected JSON
    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl RequestError {
    /// HTTP status of the failed call, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            RequestError::Status { .. } => "http_status",
            RequestError::Transport(_) => "transport",
            RequestError::Decode { .. } => "decode",
            RequestError::Config(_) => "config",
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RequestError::Decode {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                reason: err.to_string(),
            }
        } else {
            RequestError::Transport(err)
        }
    }
}

/// Failure inside the background stream listener
///
/// These are never handed to the caller; the listener logs them and stops.
#[cfg(feature = "websocket")]
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Connection closed by server")]
    Closed,

    #[error("Event receiver dropped")]
    ReceiverDropped,
}

pub type Result<T> = std::result::Result<T, RequestError>;
