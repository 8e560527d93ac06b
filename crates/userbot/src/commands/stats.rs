//! Stats command - the sender's activity record.

use crate::commands::{CommandContext, CommandHandler, CommandOutput};
use crate::error::CommandOutcome;
use agent_state::{ActivityTable, Clock};
use async_trait::async_trait;
use std::sync::Arc;

pub struct StatsHandler {
    activity: ActivityTable,
    clock: Arc<dyn Clock>,
}

impl StatsHandler {
    pub fn new(activity: ActivityTable, clock: Arc<dyn Clock>) -> Self {
        Self { activity, clock }
    }
}

#[async_trait]
impl CommandHandler for StatsHandler {
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        let record = self.activity.get(ctx.sender_id, self.clock.now()).await;

        let reply = format!(
            "📊 **Your Statistics**\n\n\
             👤 **User:** {}\n\
             💬 **Messages Sent:** {}\n\
             👀 **Last Active:** {}\n\
             🆔 **User ID:** {}\n\n\
             _Statistics are session-based_",
            ctx.event.display_name(),
            record.messages,
            record.last_seen.format("%Y-%m-%d %H:%M UTC"),
            ctx.sender_id
        );

        Ok(CommandOutput::new(reply, "Stats sent")
            .with_data(serde_json::json!({ "messages": record.messages })))
    }
}
