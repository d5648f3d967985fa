//! Configuration Management
//!
//! This module handles loading and managing configuration including API credentials.

pub mod client;
pub mod credentials;

// Re-export
pub use client::ClientConfig;
pub use credentials::{Credentials, SecretString};
