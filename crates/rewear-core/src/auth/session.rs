use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::tokens::{StoredTokens, TokenStore};
use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

/// Read-only view of the session handed to the view layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    /// True until `SessionStore::init` has settled
    pub is_loading: bool,
}

impl SessionSnapshot {
    pub fn state(&self) -> SessionState {
        if self.user.is_some() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.state() == SessionState::LoggedIn
    }
}

/// Single owner of the authenticated identity.
///
/// The store shares its `TokenStore` with the `ApiClient`, so stored tokens
/// are what the client attaches. Only the store writes the snapshot;
/// everyone else reads it through `snapshot()` or `subscribe()`.
#[derive(Debug)]
pub struct SessionStore {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        let tokens = api.token_store();
        let (state, _) = watch::channel(SessionSnapshot {
            user: None,
            is_loading: true,
        });
        Self { api, tokens, state }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Receive every published change to the session
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in()
    }

    fn stored_access_token(&self) -> Option<String> {
        match self.tokens.access_token() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored tokens");
                None
            }
        }
    }

    /// Whether token storage currently holds an access token
    pub fn has_stored_token(&self) -> bool {
        self.stored_access_token().is_some()
    }

    fn clear_tokens(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "Failed to clear stored tokens");
        }
    }

    /// Publish a user, but only while a token is still stored. A logout that
    /// raced an in-flight fetch wins.
    fn publish_user(&self, user: User) -> bool {
        self.state.send_if_modified(|s| {
            s.is_loading = false;
            if !self.has_stored_token() {
                debug!("Tokens cleared while fetching user, discarding result");
                s.user = None;
                return true;
            }
            s.user = Some(user);
            true
        });
        self.is_logged_in()
    }

    fn publish_logged_out(&self) {
        self.state.send_modify(|s| {
            s.user = None;
            s.is_loading = false;
        });
    }

    /// Settle the initial state from whatever token storage holds.
    ///
    /// With no token this makes no network call. A failed user fetch is
    /// not surfaced: the tokens are dropped and the session is logged out.
    pub async fn init(&self) -> SessionSnapshot {
        if !self.has_stored_token() {
            debug!("No stored token, session starts logged out");
            self.publish_logged_out();
            return self.snapshot();
        }

        match self.api.current_user().await {
            Ok(user) => {
                if self.publish_user(user) {
                    info!("Session restored from stored token");
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch user data, clearing stored tokens");
                self.clear_tokens();
                self.publish_logged_out();
            }
        }
        self.snapshot()
    }

    /// Log in and keep both tokens and the returned user.
    ///
    /// Tokens are persisted before the user is published; a storage failure
    /// is reported and leaves the session logged out.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let response = self.api.login(email, password).await?;

        self.tokens
            .save(&StoredTokens::from(response.token))
            .map_err(ApiError::Storage)?;

        if !self.publish_user(response.user.clone()) {
            warn!(email, "Stored tokens missing after login");
            return Err(ApiError::Storage(anyhow::anyhow!(
                "tokens were not retained after login"
            )));
        }
        info!(email, "Login successful");
        Ok(response.user)
    }

    /// Forget the user and the stored tokens. Nothing is sent to the backend.
    pub fn logout(&self) {
        self.state.send_modify(|s| {
            s.user = None;
            s.is_loading = false;
            self.clear_tokens();
        });
        info!("Logged out");
    }

    /// Re-fetch the current user; on failure the session is logged out and
    /// the error returned.
    pub async fn refresh(&self) -> ApiResult<User> {
        match self.api.current_user().await {
            Ok(user) => {
                self.publish_user(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Failed to refresh user data");
                self.logout();
                Err(e)
            }
        }
    }

    /// React to a `SessionExpired` signal.
    ///
    /// Returns `true` if a user or token was cleared. Once cleared, further
    /// calls find nothing and return `false`, so repeated 401s clear once.
    pub fn expire(&self) -> bool {
        self.expire_session(None)
    }

    /// Clear the session, unless `sent_token` is given and storage now
    /// holds a different token. A 401 for a login that has since been
    /// replaced leaves the newer session in place.
    fn expire_session(&self, sent_token: Option<&str>) -> bool {
        let cleared = self.state.send_if_modified(|s| {
            let stored = self.stored_access_token();
            if let (Some(sent), Some(current)) = (sent_token, stored.as_deref()) {
                if sent != current {
                    debug!("401 for a replaced token, keeping current session");
                    return false;
                }
            }
            let had_user = s.user.take().is_some();
            let had_token = stored.is_some();
            if had_token {
                self.clear_tokens();
            }
            had_user || had_token
        });
        if cleared {
            info!("Session expired, cleared user and stored tokens");
        }
        cleared
    }

    /// Pass an API result through, expiring the session on `SessionExpired`.
    pub fn guard<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(ApiError::SessionExpired { token }) = &result {
            self.expire_session(Some(token.as_str()));
        }
        result
    }
}
