//! In-memory reminder storage ordered by due time.

use crate::error::StateError;
use crate::types::*;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

const ID_LEN: usize = 8;

struct Entry {
    reminder: Reminder,
    seq: u64,
}

#[derive(Default)]
struct ReminderIndex {
    by_id: HashMap<ReminderId, Entry>,
    /// Due index: (due_at, insertion seq) -> id.
    due: BTreeMap<(DateTime<Utc>, u64), ReminderId>,
    next_seq: u64,
}

impl ReminderIndex {
    fn fresh_id(&self) -> ReminderId {
        let mut rng = rand::thread_rng();
        loop {
            let candidate: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(ID_LEN)
                .map(char::from)
                .collect();
            let id = ReminderId::new(candidate);
            if !self.by_id.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Pending reminders, process-scoped.
///
/// Scans are range queries over the due index, so a tick only touches
/// reminders that are actually due.
#[derive(Clone, Default)]
pub struct ReminderStore {
    inner: Arc<RwLock<ReminderIndex>>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a reminder. `due_at` must be strictly after `now`.
    #[instrument(skip(self, text))]
    pub async fn insert(
        &self,
        user_id: UserId,
        chat_id: ChatId,
        due_at: DateTime<Utc>,
        text: impl Into<String> + Send,
        now: DateTime<Utc>,
    ) -> Result<ReminderId, StateError> {
        if due_at <= now {
            return Err(StateError::NotInFuture { due_at, now });
        }

        let mut index = self.inner.write().await;
        let id = index.fresh_id();
        let seq = index.next_seq;
        index.next_seq += 1;

        index.due.insert((due_at, seq), id.clone());
        index.by_id.insert(
            id.clone(),
            Entry {
                reminder: Reminder {
                    user_id,
                    chat_id,
                    due_at,
                    text: text.into(),
                    created_at: now,
                },
                seq,
            },
        );

        debug!("Stored reminder {} (pending: {})", id, index.by_id.len());
        Ok(id)
    }

    /// All reminders due at or before `now`, earliest first.
    ///
    /// The sequence is a snapshot taken under the read lock; deleting while
    /// iterating is safe.
    pub async fn due_before(
        &self,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = (ReminderId, Reminder)> {
        let index = self.inner.read().await;
        let due: Vec<(ReminderId, Reminder)> = index
            .due
            .range(..=(now, u64::MAX))
            .filter_map(|(_, id)| {
                index
                    .by_id
                    .get(id)
                    .map(|entry| (id.clone(), entry.reminder.clone()))
            })
            .collect();
        due.into_iter()
    }

    /// Remove a reminder. Returns whether it was present.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ReminderId) -> bool {
        let mut index = self.inner.write().await;
        match index.by_id.remove(id) {
            Some(entry) => {
                index.due.remove(&(entry.reminder.due_at, entry.seq));
                true
            }
            None => false,
        }
    }

    /// Pending reminders owned by `user_id`, earliest first.
    pub async fn list_for_user(&self, user_id: UserId) -> Vec<(ReminderId, Reminder)> {
        let index = self.inner.read().await;
        index
            .due
            .values()
            .filter_map(|id| index.by_id.get(id).map(|entry| (id, entry)))
            .filter(|(_, entry)| entry.reminder.user_id == user_id)
            .map(|(id, entry)| (id.clone(), entry.reminder.clone()))
            .collect()
    }

    /// Due time of the earliest pending reminder.
    pub async fn next_due(&self) -> Option<DateTime<Utc>> {
        let index = self.inner.read().await;
        index.due.keys().next().map(|(due_at, _)| *due_at)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_id.is_empty()
    }
}
