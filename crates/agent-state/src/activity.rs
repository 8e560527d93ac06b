//! Per-user activity counters.

use crate::types::{ActivityRecord, UserId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Message counters keyed by user. Records are never evicted.
#[derive(Clone, Default)]
pub struct ActivityTable {
    records: Arc<RwLock<HashMap<UserId, ActivityRecord>>>,
}

impl ActivityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one message from `user_id` seen at `now`.
    pub async fn record_message(&self, user_id: UserId, now: DateTime<Utc>) -> ActivityRecord {
        let mut records = self.records.write().await;
        let record = records
            .entry(user_id)
            .or_insert_with(|| ActivityRecord::empty(now));
        record.messages += 1;
        record.last_seen = now;
        *record
    }

    /// Stored record, or a zero record stamped `now` for unknown users.
    pub async fn get(&self, user_id: UserId, now: DateTime<Utc>) -> ActivityRecord {
        let records = self.records.read().await;
        records
            .get(&user_id)
            .copied()
            .unwrap_or_else(|| ActivityRecord::empty(now))
    }

    /// Number of distinct users seen.
    pub async fn tracked_users(&self) -> usize {
        self.records.read().await.len()
    }
}
