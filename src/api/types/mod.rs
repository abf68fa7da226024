//! Shared request and response types

pub mod error;
pub mod json;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType, DependencyFailure};
pub use json::Json;
