//! Auto-reply and spam keyword rules.

use crate::error::StateError;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

const DEFAULT_AUTO_REPLIES: &[(&str, &str)] = &[
    ("hello", "Hello there! 👋"),
    ("hi", "Hi! How can I help? 😊"),
    ("thanks", "You're welcome! 🙏"),
    ("thank you", "You're welcome! 🙏"),
];

const DEFAULT_SPAM_FILTERS: &[&str] = &["spam", "advertisement", "promotion"];

struct Rules {
    auto_replies: BTreeMap<String, String>,
    spam_filters: BTreeSet<String>,
    auto_reply_enabled: bool,
    spam_detection_enabled: bool,
}

/// Trigger tables consulted for every non-command message.
///
/// Triggers and filter words are stored lower-case. Auto-reply matching
/// walks triggers in lexical order and returns the first hit.
#[derive(Clone)]
pub struct RuleStore {
    inner: Arc<RwLock<Rules>>,
}

impl RuleStore {
    /// Empty rule tables, both features enabled.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Rules {
                auto_replies: BTreeMap::new(),
                spam_filters: BTreeSet::new(),
                auto_reply_enabled: true,
                spam_detection_enabled: true,
            })),
        }
    }

    /// Rule tables seeded with the stock greetings and spam words.
    pub fn with_defaults() -> Self {
        let rules = Rules {
            auto_replies: DEFAULT_AUTO_REPLIES
                .iter()
                .map(|(t, r)| (t.to_string(), r.to_string()))
                .collect(),
            spam_filters: DEFAULT_SPAM_FILTERS.iter().map(|w| w.to_string()).collect(),
            auto_reply_enabled: true,
            spam_detection_enabled: true,
        };
        Self {
            inner: Arc::new(RwLock::new(rules)),
        }
    }

    /// Add or overwrite an auto-reply rule.
    pub async fn add_auto_reply(&self, trigger: &str, response: &str) -> Result<(), StateError> {
        let trigger = trigger.to_lowercase();
        if trigger.trim().is_empty() {
            return Err(StateError::InvalidRule("empty trigger".into()));
        }
        if response.trim().is_empty() {
            return Err(StateError::InvalidRule("empty response".into()));
        }

        let mut rules = self.inner.write().await;
        rules.auto_replies.insert(trigger.clone(), response.to_string());
        info!("Auto-reply added: {}", trigger);
        Ok(())
    }

    /// Response for the first trigger contained in `text`, if any.
    pub async fn match_auto_reply(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        let rules = self.inner.read().await;
        rules
            .auto_replies
            .iter()
            .find(|(trigger, _)| lower.contains(trigger.as_str()))
            .map(|(_, response)| response.clone())
    }

    /// Add a spam keyword.
    pub async fn add_spam_filter(&self, word: &str) -> Result<(), StateError> {
        let word = word.to_lowercase();
        if word.trim().is_empty() {
            return Err(StateError::InvalidRule("empty filter".into()));
        }

        let mut rules = self.inner.write().await;
        rules.spam_filters.insert(word.clone());
        info!("Spam filter added: {}", word);
        Ok(())
    }

    /// Whether any spam keyword occurs in `text`, ignoring case.
    pub async fn is_spam(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        let rules = self.inner.read().await;
        rules
            .spam_filters
            .iter()
            .any(|word| lower.contains(word.as_str()))
    }

    /// Snapshot of all auto-reply rules, ordered by trigger.
    pub async fn auto_replies(&self) -> Vec<(String, String)> {
        let rules = self.inner.read().await;
        rules
            .auto_replies
            .iter()
            .map(|(t, r)| (t.clone(), r.clone()))
            .collect()
    }

    /// Snapshot of all spam keywords.
    pub async fn spam_filters(&self) -> Vec<String> {
        self.inner.read().await.spam_filters.iter().cloned().collect()
    }

    pub async fn set_auto_reply_enabled(&self, enabled: bool) {
        self.inner.write().await.auto_reply_enabled = enabled;
    }

    pub async fn auto_reply_enabled(&self) -> bool {
        self.inner.read().await.auto_reply_enabled
    }

    pub async fn set_spam_detection_enabled(&self, enabled: bool) {
        self.inner.write().await.spam_detection_enabled = enabled;
    }

    pub async fn spam_detection_enabled(&self) -> bool {
        self.inner.read().await.spam_detection_enabled
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}
