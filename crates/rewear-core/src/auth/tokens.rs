use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TokenPair;

/// Token file name in cache directory
const TOKENS_FILE: &str = "tokens.json";

/// The persisted credential pair. Presence of an access token means "logged in".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub stored_at: Option<DateTime<Utc>>,
}

impl StoredTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            stored_at: Some(Utc::now()),
        }
    }

    /// Minutes since the pair was stored, if known
    pub fn age_minutes(&self) -> Option<i64> {
        self.stored_at.map(|at| (Utc::now() - at).num_minutes())
    }
}

impl From<TokenPair> for StoredTokens {
    fn from(pair: TokenPair) -> Self {
        Self::new(pair.access, pair.refresh)
    }
}

/// Storage for the credential pair.
///
/// Implementations must treat a missing pair as `Ok(None)` and make
/// `clear` succeed when nothing is stored.
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    fn load(&self) -> Result<Option<StoredTokens>>;

    fn save(&self, tokens: &StoredTokens) -> Result<()>;

    fn clear(&self) -> Result<()>;

    fn access_token(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|t| t.access_token))
    }

    fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|t| t.refresh_token))
    }
}

/// Tokens kept as JSON in the cache directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    cache_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn tokens_path(&self) -> PathBuf {
        self.cache_dir.join(TOKENS_FILE)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredTokens>> {
        let path = self.tokens_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read tokens file")?;
        let tokens: StoredTokens =
            serde_json::from_str(&contents).context("Failed to parse tokens file")?;
        Ok(Some(tokens))
    }

    fn save(&self, tokens: &StoredTokens) -> Result<()> {
        let path = self.tokens_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
        }
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(path, contents).context("Failed to write tokens file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.tokens_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove tokens file")?;
        }
        Ok(())
    }
}

/// Tokens held only for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<StoredTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: StoredTokens) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredTokens>>> {
        self.tokens
            .lock()
            .map_err(|_| anyhow::anyhow!("Token store lock poisoned"))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredTokens>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, tokens: &StoredTokens) -> Result<()> {
        *self.lock()? = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}
