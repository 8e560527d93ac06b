//! Stored record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque platform user id.
pub type UserId = i64;

/// Opaque platform chat id.
pub type ChatId = i64;

/// Identifier of a pending reminder. Unique among stored reminders only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReminderId(String);

impl ReminderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message to deliver to a user once `due_at` has passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub user_id: UserId,
    /// Chat the reminder was requested from.
    pub chat_id: ChatId,
    pub due_at: DateTime<Utc>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Per-user message counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub messages: u64,
    pub last_seen: DateTime<Utc>,
}

impl ActivityRecord {
    /// Record for a user that has not been seen yet.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            messages: 0,
            last_seen: now,
        }
    }
}
