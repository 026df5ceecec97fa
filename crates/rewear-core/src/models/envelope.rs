use serde::{Deserialize, Serialize};

/// A list response: `{success, count, results}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// A response that only reports an outcome message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageResponse {
    pub fn message_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(default)
    }
}

// Single-object wrappers; the client unwraps these before returning.

#[derive(Debug, Deserialize)]
pub(crate) struct ItemEnvelope {
    pub item: super::Item,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionEnvelope {
    pub transaction: super::Transaction,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RatingEnvelope {
    pub rating: super::Rating,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadEnvelope {
    pub images: Vec<super::UploadedImage>,
}
