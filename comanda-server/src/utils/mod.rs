//! Utilities
//!
//! - [`AppError`] / [`ApiResponse`] re-exported from `shared::error`
//! - logging setup and input validation

pub mod logger;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
