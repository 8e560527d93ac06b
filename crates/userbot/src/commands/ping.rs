//! Ping command - liveness check.

use crate::commands::{CommandContext, CommandHandler, CommandOutput};
use crate::error::CommandOutcome;
use async_trait::async_trait;

pub struct PingHandler;

impl PingHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PingHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for PingHandler {
    async fn execute(&self, _ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        Ok(CommandOutput::new("🏓 **Pong!**\n⚡ Rust + Tokio", "Pong sent"))
    }
}
