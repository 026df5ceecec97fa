//! Authentication module for the client session and its stored tokens.
//!
//! This module provides:
//! - `SessionStore`: the single owner of "am I logged in, and as whom"
//! - `TokenStore`: persistence seam for the JWT pair, with file,
//!   OS keychain (`KeyringTokenStore`) and in-memory backends
//!
//! The stored access token is what the `ApiClient` attaches to requests.

pub mod credentials;
pub mod session;
pub mod tokens;

pub use credentials::KeyringTokenStore;
pub use session::{SessionSnapshot, SessionState, SessionStore};
pub use tokens::{FileTokenStore, MemoryTokenStore, StoredTokens, TokenStore};
