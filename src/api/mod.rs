//! 1C API Client
//!
//! HTTP client and update-stream listener for the 1C Optimization Project API.

pub mod client;
pub mod types;

#[cfg(feature = "websocket")]
pub mod websocket;

// Re-export commonly used types
pub use client::{OneCApiClient, DEFAULT_SLOW_QUERY_LIMIT};
pub use types::{
    ApiErrorBody, ApiResponse, Detail, GenerateDataRequest, GenerateDataResponse, MetricsRange,
    MetricsResponse, ReportRequest, ReportResponse, ResponseMetadata, SlowQuery, StreamEvent,
    TopProduct, Update,
};

#[cfg(feature = "websocket")]
pub use websocket::{stream_url, StreamSubscription};
