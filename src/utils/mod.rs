//! Utility modules for the favicon proxy
//!
//! This module contains reusable utilities that can be used
//! across different parts of the system.

pub mod http_client;
pub mod http_client_factory;
pub mod url;

// Re-export commonly used types for convenience
pub use http_client::{FetchedResponse, PageFetcher, StandardHttpClient};
pub use http_client_factory::HttpClientFactory;
