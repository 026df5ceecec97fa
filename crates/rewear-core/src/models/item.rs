use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Transaction, User};
use crate::api::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemImage {
    #[serde(default)]
    pub image_id: Option<String>,
    pub image: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A listed garment. Browse results carry a subset of the detail fields,
/// so everything beyond the identity and pricing is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: String,
    #[serde(default)]
    pub uploader: Option<User>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub points_value: i64,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub tag_list: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub images: Vec<ItemImage>,
    #[serde(default)]
    pub primary_image: Option<String>,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub views_count: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Item {
    /// URL of the primary image, falling back to the first image
    pub fn cover_image(&self) -> Option<&str> {
        self.primary_image.as_deref().or_else(|| {
            self.images
                .iter()
                .find(|i| i.is_primary)
                .or_else(|| self.images.first())
                .map(|i| i.image.as_str())
        })
    }

    pub fn is_available(&self) -> bool {
        matches!(self.status.as_deref(), None | Some("available"))
    }
}

/// Browse filters for `GET /items/`. Only set filters are sent, in field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ItemFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub size: String,
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub points_value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Image URLs returned by the upload endpoint; the first becomes primary
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseMode {
    Points,
    Currency,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseRequest {
    pub mode: PurchaseMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_used: Option<i64>,
}

impl PurchaseRequest {
    pub fn points(points_used: i64) -> Self {
        Self {
            mode: PurchaseMode::Points,
            amount: None,
            points_used: Some(points_used),
        }
    }

    pub fn currency(amount: f64) -> Self {
        Self {
            mode: PurchaseMode::Currency,
            amount: Some(amount),
            points_used: None,
        }
    }

    /// Each mode needs its own positive amount.
    pub fn validate(&self) -> ApiResult<()> {
        match self.mode {
            PurchaseMode::Points => match self.points_used {
                Some(points) if points > 0 => Ok(()),
                _ => Err(ApiError::InvalidRequest(
                    "Points amount is required for points purchases".to_string(),
                )),
            },
            PurchaseMode::Currency => match self.amount {
                Some(amount) if amount > 0.0 => Ok(()),
                _ => Err(ApiError::InvalidRequest(
                    "Amount is required for currency purchases".to_string(),
                )),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub transaction: Option<Transaction>,
}
