//! REST API client module for the ReWear backend.
//!
//! This module provides the `ApiClient` for the auth, user, item, swap
//! and upload endpoints. Requests carry a JWT bearer token read from the
//! shared `TokenStore` whenever one is stored.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult, ErrorMessage};
