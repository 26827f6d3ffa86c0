//! Centralized error handling for the favicon proxy
//!
//! # Error Categories
//!
//! - **Fetch Errors**: network failures and non-success upstream statuses
//! - **Decode Errors**: image payloads that cannot be decoded or embedded
//! - **Configuration Errors**: invalid or unreadable configuration
//!
//! # Usage
//!
//! ```rust
//! use favicon_proxy::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::decode("truncated png"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
