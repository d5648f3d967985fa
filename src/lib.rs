// Library exports for onec-api-client

pub mod cli;
pub mod error;

pub mod api; // 1C REST client and update stream
pub mod config; // Credentials and client settings
pub mod report; // Tables, charts and CSV export of report data

pub use api::OneCApiClient;
pub use error::RequestError;
