//! Auto-reply management commands.

use crate::commands::{CommandContext, CommandHandler, CommandOutput};
use crate::error::{CommandError, CommandOutcome};
use agent_state::RuleStore;
use async_trait::async_trait;
use tracing::info;

/// `autoreply on|off|list`
pub struct AutoReplyHandler {
    rules: RuleStore,
}

impl AutoReplyHandler {
    pub fn new(rules: RuleStore) -> Self {
        Self { rules }
    }

    fn usage(prefix: char) -> String {
        format!(
            "❌ **Usage:**\n`{p}autoreply on` - Enable\n`{p}autoreply off` - Disable\n`{p}autoreply list` - Show all",
            p = prefix
        )
    }
}

#[async_trait]
impl CommandHandler for AutoReplyHandler {
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        let action = match ctx.args.first() {
            Some(action) => action.to_lowercase(),
            None => return Err(CommandError::invalid("missing action", Self::usage(ctx.prefix))),
        };

        match action.as_str() {
            "on" => {
                self.rules.set_auto_reply_enabled(true).await;
                info!("Auto-reply enabled by {}", ctx.sender_id);
                Ok(CommandOutput::new(
                    format!("✅ **Auto-reply enabled**\nUse `{}addar <word> <reply>`", ctx.prefix),
                    "Auto-reply enabled",
                ))
            }
            "off" => {
                self.rules.set_auto_reply_enabled(false).await;
                info!("Auto-reply disabled by {}", ctx.sender_id);
                Ok(CommandOutput::new("❌ **Auto-reply disabled**", "Auto-reply disabled"))
            }
            "list" => {
                let entries = self.rules.auto_replies().await;
                let list = if entries.is_empty() {
                    "No auto-replies".to_string()
                } else {
                    entries
                        .iter()
                        .map(|(word, reply)| format!("• **{}** → {}", word, reply))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                Ok(CommandOutput::new(format!("📋 **Auto-reply List**\n\n{}", list), "Auto-reply list")
                    .with_data(serde_json::json!({ "count": entries.len() })))
            }
            other => Err(CommandError::invalid(
                format!("unknown action {:?}", other),
                format!("❌ **Invalid action**\n{}", Self::usage(ctx.prefix)),
            )),
        }
    }
}

/// `addar <word> <reply>`
pub struct AddAutoReplyHandler {
    rules: RuleStore,
}

impl AddAutoReplyHandler {
    pub fn new(rules: RuleStore) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl CommandHandler for AddAutoReplyHandler {
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        if ctx.args.len() < 2 {
            return Err(CommandError::invalid(
                "need a trigger and a reply",
                ctx.usage("addar <word> <reply>"),
            ));
        }

        let word = ctx.args[0].to_lowercase();
        let reply = ctx.args[1..].join(" ");
        self.rules.add_auto_reply(&word, &reply).await?;

        info!("Auto-reply added: {} → {}", word, reply);
        Ok(CommandOutput::new(
            format!("✅ **Auto-reply added**\n**Trigger:** {}\n**Reply:** {}", word, reply),
            "Auto-reply added",
        )
        .with_data(serde_json::json!({ "word": word, "reply": reply })))
    }
}
