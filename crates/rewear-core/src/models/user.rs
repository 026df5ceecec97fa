use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A ReWear user.
///
/// `/users/me/` returns the full profile while `/auth/login/` returns a
/// compact form (`id`, `name`, `points`, `rating`, `member_since`); the
/// aliases let one type decode both. Public profiles omit `email`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, alias = "id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, alias = "points")]
    pub points_balance: i64,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub total_swaps: u32,
    #[serde(default)]
    pub items_listed: u32,
    #[serde(default)]
    pub completed_swaps: u32,
    #[serde(default)]
    pub ongoing_swaps: u32,
    #[serde(default, alias = "rating")]
    pub average_rating: Option<f64>,
    #[serde(default, alias = "member_since")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Best available name for display
    pub fn display_name(&self) -> String {
        if let Some(ref name) = self.full_name {
            if !name.trim().is_empty() {
                return name.clone();
            }
        }
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        let joined = format!("{} {}", first, last).trim().to_string();
        if !joined.is_empty() {
            return joined;
        }
        self.email.clone().unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// Partial update for `PUT /users/me/`. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.bio.is_none()
            && self.location.is_none()
            && self.phone_number.is_none()
    }
}
