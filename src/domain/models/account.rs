use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain model for an account: an isolated tracking context with its own
/// goals and journey start date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    /// Anchor of the 8-week journey; unset until the user picks one.
    pub start_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Generate a unique ID for an account
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("account::{}", timestamp_millis)
    }
}
