//! Core library for the ReWear clothing-exchange marketplace client.
//!
//! - `api`: the `ApiClient` that talks to the ReWear REST backend
//! - `auth`: the `SessionStore` and the token storage backends
//! - `models`: typed renditions of the backend's JSON payloads
//! - `config`: on-disk configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, ApiResult};
pub use auth::{SessionSnapshot, SessionState, SessionStore, StoredTokens, TokenStore};
pub use config::{Config, TokenBackend};
