//! Spam filter management commands.

use crate::commands::{CommandContext, CommandHandler, CommandOutput};
use crate::error::{CommandError, CommandOutcome};
use agent_state::RuleStore;
use async_trait::async_trait;
use tracing::info;

/// `antispam on|off|list`
pub struct AntiSpamHandler {
    rules: RuleStore,
}

impl AntiSpamHandler {
    pub fn new(rules: RuleStore) -> Self {
        Self { rules }
    }

    fn usage(prefix: char) -> String {
        format!(
            "❌ **Usage:**\n`{p}antispam on` - Enable\n`{p}antispam off` - Disable\n`{p}antispam list` - Show filters",
            p = prefix
        )
    }
}

#[async_trait]
impl CommandHandler for AntiSpamHandler {
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        let Some(action) = ctx.args.first().map(|a| a.to_lowercase()) else {
            return Err(CommandError::invalid("missing action", Self::usage(ctx.prefix)));
        };

        match action.as_str() {
            "on" => {
                self.rules.set_spam_detection_enabled(true).await;
                info!("Spam detection enabled by {}", ctx.sender_id);
                Ok(CommandOutput::new(
                    format!("✅ **Anti-spam enabled**\nUse `{}addfilter <word>`", ctx.prefix),
                    "Anti-spam enabled",
                ))
            }
            "off" => {
                self.rules.set_spam_detection_enabled(false).await;
                info!("Spam detection disabled by {}", ctx.sender_id);
                Ok(CommandOutput::new("❌ **Anti-spam disabled**", "Anti-spam disabled"))
            }
            "list" => {
                let filters = self.rules.spam_filters().await;
                let list = if filters.is_empty() {
                    "No filters".to_string()
                } else {
                    filters
                        .iter()
                        .map(|word| format!("• {}", word))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                Ok(CommandOutput::new(format!("🛡️ **Spam Filters**\n\n{}", list), "Spam filter list"))
            }
            other => Err(CommandError::invalid(
                format!("unknown action {:?}", other),
                format!("❌ **Invalid action**\n{}", Self::usage(ctx.prefix)),
            )),
        }
    }
}

/// `addfilter <word>`
pub struct AddFilterHandler {
    rules: RuleStore,
}

impl AddFilterHandler {
    pub fn new(rules: RuleStore) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl CommandHandler for AddFilterHandler {
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        let Some(word) = ctx.args.first().map(|w| w.to_lowercase()) else {
            return Err(CommandError::invalid("no word", ctx.usage("addfilter <word>")));
        };

        self.rules.add_spam_filter(&word).await?;

        info!("Spam filter added: {}", word);
        Ok(CommandOutput::new(
            format!("✅ **Spam filter added**\n**Filter:** {}", word),
            "Filter added",
        )
        .with_data(serde_json::json!({ "word": word })))
    }
}
