use anyhow::{Context, Result};
use keyring::Entry;

use super::tokens::{StoredTokens, TokenStore};

const SERVICE_NAME: &str = "rewear";

const ACCESS_TOKEN_KEY: &str = "access_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Tokens kept in the OS keychain, one entry per token.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service: String,
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<StoredTokens>> {
        let access = self.read(ACCESS_TOKEN_KEY)?;
        let refresh = self.read(REFRESH_TOKEN_KEY)?;
        // A half-written pair is treated as no session at all
        Ok(match (access, refresh) {
            (Some(access_token), Some(refresh_token)) => Some(StoredTokens {
                access_token,
                refresh_token,
                stored_at: None,
            }),
            _ => None,
        })
    }

    fn save(&self, tokens: &StoredTokens) -> Result<()> {
        self.entry(ACCESS_TOKEN_KEY)?
            .set_password(&tokens.access_token)
            .context("Failed to store access token in keychain")?;
        self.entry(REFRESH_TOKEN_KEY)?
            .set_password(&tokens.refresh_token)
            .context("Failed to store refresh token in keychain")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        // Attempt both removals before reporting a failure
        let access = self.remove(ACCESS_TOKEN_KEY);
        let refresh = self.remove(REFRESH_TOKEN_KEY);
        access.and(refresh)
    }
}
