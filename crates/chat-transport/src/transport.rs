//! Outbound send primitive shared by replies, auto-replies and reminders.

use crate::error::TransportError;
use crate::types::{PeerId, SendOptions};
use async_trait::async_trait;

/// Anything that can deliver a text message to a chat or user.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `text` to `peer` (a chat id, or a user id for direct delivery).
    async fn send(
        &self,
        peer: PeerId,
        text: &str,
        options: &SendOptions,
    ) -> Result<(), TransportError>;
}
