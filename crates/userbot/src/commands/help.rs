//! Help command - lists registered commands.

use crate::commands::{CommandContext, CommandHandler, CommandOutput, CommandSpec};
use crate::error::CommandOutcome;
use async_trait::async_trait;

pub struct HelpHandler {
    specs: Vec<CommandSpec>,
}

impl HelpHandler {
    pub fn new(specs: Vec<CommandSpec>) -> Self {
        Self { specs }
    }
}

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        let lines: Vec<String> = self
            .specs
            .iter()
            .map(|spec| format!("{}{} - {}", ctx.prefix, spec.usage, spec.description))
            .collect();

        Ok(CommandOutput::new(
            format!(
                "📖 **Available Commands**\n\n{}\n\n🔒 _Secure Userbot_",
                lines.join("\n")
            ),
            "Help sent",
        ))
    }
}
