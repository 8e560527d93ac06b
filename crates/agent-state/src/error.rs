//! State store errors.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum StateError {
    #[error("Reminder due time {due_at} is not after {now}")]
    NotInFuture {
        due_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),
}
