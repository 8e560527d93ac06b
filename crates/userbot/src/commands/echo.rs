//! Echo command - repeats the arguments back.

use crate::commands::{CommandContext, CommandHandler, CommandOutput};
use crate::error::{CommandError, CommandOutcome};
use async_trait::async_trait;

pub struct EchoHandler;

impl EchoHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EchoHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for EchoHandler {
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        if ctx.args.is_empty() {
            return Err(CommandError::invalid("no text", ctx.usage("echo <text>")));
        }

        let text = ctx.rest();
        Ok(CommandOutput::new(format!("📢 {}", text), "Echoed")
            .with_data(serde_json::json!({ "text": text })))
    }
}
