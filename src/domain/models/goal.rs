use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::timeline::JOURNEY_WEEKS;

/// Domain model for a goal: a titled, optionally described task assigned to
/// one of the journey's 8 weeks, with a completion flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    /// Owning account; never changes after creation.
    pub account_id: String,
    /// Target week, 1..=8.
    pub week: u8,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Generate a unique ID for a goal
    pub fn generate_id(account_id: &str, now_millis: u64) -> String {
        format!("goal::{}_{}", account_id, now_millis)
    }

    /// Whether a week number is a valid journey week.
    pub fn is_valid_week(week: u8) -> bool {
        (1..=JOURNEY_WEEKS).contains(&week)
    }
}
