//! Data models for ReWear entities.
//!
//! This module contains the structures exchanged with the backend:
//!
//! - `User`: profile and points balance (full and login-compact forms)
//! - `Item`, `ItemImage`, `ItemFilters`: listed garments and browse filters
//! - `Transaction`, `SwapRequest`, `SwapAction`: swap lifecycle
//! - `Rating`: user-to-user feedback
//! - `ImageUpload`, `UploadedImage`: multipart image uploads
//! - Envelope types: `Page`, `MessageResponse` and friends

pub mod auth;
pub mod envelope;
pub mod item;
pub mod rating;
pub mod transaction;
pub mod upload;
pub mod user;

pub use auth::{LoginRequest, LoginResponse, SignupRequest, SignupResponse, TokenPair};
pub use envelope::{MessageResponse, Page};
pub use item::{Item, ItemFilters, ItemImage, ItemUpdate, NewItem, PurchaseMode, PurchaseRequest, PurchaseResponse};
pub use rating::{Rating, RatingsPage};
pub use transaction::{SwapAction, SwapMethod, SwapRequest, Transaction};
pub use upload::{ImageUpload, UploadedImage, MAX_UPLOAD_IMAGES};
pub use user::{ProfileUpdate, User};
