use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Item, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapMethod {
    Swap,
    Points,
    Donation,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for SwapMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapMethod::Swap => f.pad("swap"),
            SwapMethod::Points => f.pad("points"),
            SwapMethod::Donation => f.pad("donation"),
            SwapMethod::Other => f.pad("other"),
        }
    }
}

/// Status transitions a participant can request on a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapAction {
    Accept,
    Decline,
    Complete,
}

impl std::fmt::Display for SwapAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapAction::Accept => f.pad("accept"),
            SwapAction::Decline => f.pad("decline"),
            SwapAction::Complete => f.pad("complete"),
        }
    }
}

/// A swap or purchase, seen from the requesting user's side:
/// `partner` is the other party, `my_item`/`their_item` the goods exchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub method: SwapMethod,
    pub status: String,
    #[serde(default)]
    pub my_item: Option<Item>,
    #[serde(default)]
    pub their_item: Option<Item>,
    #[serde(default)]
    pub partner: Option<User>,
    #[serde(default)]
    pub points_amount: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_pending(&self) -> bool {
        self.status == "pending"
    }

    pub fn partner_name(&self) -> String {
        self.partner
            .as_ref()
            .map(|p| p.display_name())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SwapRequest {
    pub requested_item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offered_item_id: Option<String>,
    pub method: SwapMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_amount: Option<i64>,
}
