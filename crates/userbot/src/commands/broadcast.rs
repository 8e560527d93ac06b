//! Broadcast command, restricted to an allowlist of senders.

use crate::commands::{CommandContext, CommandHandler, CommandOutput};
use crate::error::{CommandError, CommandOutcome};
use async_trait::async_trait;
use chat_transport::PeerId;
use tracing::info;

pub struct BroadcastHandler {
    /// Senders allowed to broadcast. Empty allows everyone.
    allowed: Vec<PeerId>,
}

impl BroadcastHandler {
    pub fn new(allowed: Vec<PeerId>) -> Self {
        Self { allowed }
    }

    fn permits(&self, sender: PeerId) -> bool {
        self.allowed.is_empty() || self.allowed.contains(&sender)
    }
}

#[async_trait]
impl CommandHandler for BroadcastHandler {
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        if !self.permits(ctx.sender_id) {
            return Err(CommandError::PermissionDenied);
        }
        if ctx.args.is_empty() {
            return Err(CommandError::invalid(
                "no message",
                ctx.usage("broadcast <message>"),
            ));
        }

        let message = ctx.rest();
        info!(
            "Broadcast requested by {}: {}",
            ctx.sender_id,
            crate::handler::truncate(&message, 50)
        );

        let reply = format!(
            "📢 **Broadcast Feature**\n\n\
             This would send to all chats. Demo mode:\n\
             **Message:** {}",
            message
        );
        Ok(CommandOutput::new(reply, "Broadcast queued")
            .with_data(serde_json::json!({ "message": message })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allowlist_permits_everyone() {
        let handler = BroadcastHandler::new(Vec::new());
        assert!(handler.permits(1));
        assert!(handler.permits(-99));
    }

    #[test]
    fn test_allowlist_restricts() {
        let handler = BroadcastHandler::new(vec![10]);
        assert!(handler.permits(10));
        assert!(!handler.permits(11));
    }
}
