//! Relay wire types and the platform-agnostic event model.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Opaque user or chat identifier.
pub type PeerId = i64;

/// Update delivered by the relay.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(rename = "updateId")]
    pub update_id: i64,
    pub kind: UpdateKind,
    pub message: UpdateMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    Message,
    EditedMessage,
    MemberJoined,
    MemberLeft,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMessage {
    pub id: i64,
    #[serde(rename = "chatId")]
    pub chat_id: PeerId,
    #[serde(rename = "senderId")]
    pub sender_id: PeerId,
    #[serde(rename = "senderName")]
    pub sender_name: Option<String>,
    pub text: Option<String>,
    /// Set when the message was sent by the agent's own account.
    #[serde(default)]
    pub out: bool,
    #[serde(rename = "replyTo")]
    pub reply_to: Option<i64>,
    #[serde(rename = "isGroup", default)]
    pub is_group: bool,
    /// Unix timestamp in seconds.
    pub date: i64,
}

/// Text rendering mode for outbound messages.
///
/// Replies are written with `**bold**` and backtick code spans, so rich
/// text is sent as Markdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    #[default]
    Markdown,
    Plain,
}

/// Options accepted by [`crate::Transport::send`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub parse_mode: ParseMode,
    pub reply_to: Option<i64>,
}

impl SendOptions {
    /// Rich text, replying to the given message.
    pub fn reply(message_id: i64) -> Self {
        Self {
            parse_mode: ParseMode::Markdown,
            reply_to: Some(message_id),
        }
    }

    /// Plain text, not threaded.
    pub fn plain() -> Self {
        Self {
            parse_mode: ParseMode::Plain,
            reply_to: None,
        }
    }
}

/// Outgoing send request.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    #[serde(rename = "chatId")]
    pub chat_id: PeerId,
    pub text: String,
    #[serde(rename = "parseMode")]
    pub parse_mode: ParseMode,
    #[serde(rename = "replyTo", skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<i64>,
}

/// What kind of inbound activity an [`Event`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NewMessage,
    Edited,
    MemberJoined,
    MemberLeft,
}

impl From<UpdateKind> for EventKind {
    fn from(kind: UpdateKind) -> Self {
        match kind {
            UpdateKind::Message => Self::NewMessage,
            UpdateKind::EditedMessage => Self::Edited,
            UpdateKind::MemberJoined => Self::MemberJoined,
            UpdateKind::MemberLeft => Self::MemberLeft,
        }
    }
}

/// One inbound update, normalised for the agent.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub message_id: i64,
    pub sender_id: PeerId,
    pub chat_id: PeerId,
    pub sender_name: Option<String>,
    /// Trimmed message text (empty for membership events).
    pub text: String,
    /// Echo of a message the agent itself sent.
    pub outgoing: bool,
    pub reply_to: Option<i64>,
    pub is_group: bool,
    pub received_at: DateTime<Utc>,
}

impl Event {
    /// Build a plain new-message event.
    pub fn message(sender_id: PeerId, chat_id: PeerId, text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::NewMessage,
            message_id: 0,
            sender_id,
            chat_id,
            sender_name: None,
            text: text.into().trim().to_string(),
            outgoing: false,
            reply_to: None,
            is_group: false,
            received_at: Utc::now(),
        }
    }

    /// Convert a relay update. Message updates without text are dropped.
    pub fn from_update(update: &Update) -> Option<Self> {
        let msg = &update.message;
        let text = match update.kind {
            UpdateKind::Message | UpdateKind::EditedMessage => msg.text.as_deref()?.trim(),
            UpdateKind::MemberJoined | UpdateKind::MemberLeft => "",
        };

        Some(Self {
            kind: update.kind.into(),
            message_id: msg.id,
            sender_id: msg.sender_id,
            chat_id: msg.chat_id,
            sender_name: msg.sender_name.clone(),
            text: text.to_string(),
            outgoing: msg.out,
            reply_to: msg.reply_to,
            is_group: msg.is_group,
            received_at: Utc
                .timestamp_opt(msg.date, 0)
                .single()
                .unwrap_or_else(Utc::now),
        })
    }

    /// Name to address the sender by.
    pub fn display_name(&self) -> &str {
        self.sender_name.as_deref().unwrap_or("Unknown")
    }
}
