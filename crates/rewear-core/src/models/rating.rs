use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;

/// Lowest and highest accepted rating values
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rating_id: String,
    #[serde(default)]
    pub rater: Option<User>,
    #[serde(default)]
    pub rated_user: Option<User>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Rating {
    pub fn is_valid_value(value: u8) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&value)
    }

    pub fn stars(&self) -> String {
        let filled = self.rating.min(MAX_RATING) as usize;
        format!("{}{}", "*".repeat(filled), ".".repeat(MAX_RATING as usize - filled))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingsPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub average_rating: Option<f64>,
    pub results: Vec<Rating>,
}
