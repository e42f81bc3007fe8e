//! Typed client for the EasyGen REST backend.
//!
//! Every failure leaving this module is an [`ApiError`](crate::error::ApiError),
//! already classified into an [`ErrorKind`](crate::error::ErrorKind), so callers
//! never have to inspect raw response bodies themselves.

pub mod classify;
pub mod client;
pub mod types;

pub use classify::is_token_error;
pub use client::{ApiClient, endpoints};
pub use types::*;
