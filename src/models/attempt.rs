use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-client attempt counter for the current fixed window
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub client_id: String,
    pub attempt_count: i32,
    /// When the current window ends
    pub reset_time: DateTime<Utc>,
    pub last_attempt: DateTime<Utc>,
}

impl AttemptRecord {
    /// A record for a window opened by an attempt at `now`
    pub fn opened_at(client_id: &str, now: DateTime<Utc>, window: chrono::Duration) -> Self {
        Self {
            client_id: client_id.to_string(),
            attempt_count: 1,
            reset_time: now + window,
            last_attempt: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.reset_time
    }
}

/// Outcome of `admit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttemptDecision {
    pub allowed: bool,
    pub remaining: u32,
}

/// Outcome of `peek`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetSnapshot {
    pub remaining: u32,
}
