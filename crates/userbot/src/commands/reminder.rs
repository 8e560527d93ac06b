//! Reminder command - schedules a message for later delivery.

use crate::commands::{CommandContext, CommandHandler, CommandOutput};
use crate::error::{CommandError, CommandOutcome};
use agent_state::{Clock, ReminderStore};
use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tracing::info;

/// Longest accepted delay, in minutes (one year).
const MAX_DELAY_MINUTES: i64 = 365 * 1440;

/// Parse `<n>m`, `<n>h`, `<n>d`, or a bare `<n>` (minutes).
///
/// Returns `None` for anything that is not a positive whole number of units.
pub fn parse_delay(input: &str) -> Option<Duration> {
    let input = input.trim().to_lowercase();
    let (digits, minutes_per_unit) = match input.char_indices().last()? {
        (idx, 'm') => (&input[..idx], 1),
        (idx, 'h') => (&input[..idx], 60),
        (idx, 'd') => (&input[..idx], 1440),
        _ => (input.as_str(), 1),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let minutes = digits.parse::<i64>().ok()?.checked_mul(minutes_per_unit)?;
    if minutes <= 0 || minutes > MAX_DELAY_MINUTES {
        return None;
    }
    Some(Duration::minutes(minutes))
}

pub struct ReminderHandler {
    reminders: ReminderStore,
    clock: Arc<dyn Clock>,
}

impl ReminderHandler {
    pub fn new(reminders: ReminderStore, clock: Arc<dyn Clock>) -> Self {
        Self { reminders, clock }
    }

    fn usage(ctx: &CommandContext) -> String {
        format!(
            "{}\nExample: `{}reminder 30m Buy milk`\nTime formats: 5m, 1h, 2d",
            ctx.usage("reminder <time> <message>"),
            ctx.prefix
        )
    }
}

#[async_trait]
impl CommandHandler for ReminderHandler {
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        if ctx.args.len() < 2 {
            return Err(CommandError::invalid("missing time or message", Self::usage(ctx)));
        }

        let delay = parse_delay(&ctx.args[0]).ok_or_else(|| {
            CommandError::invalid(
                format!("bad time {:?}", ctx.args[0]),
                format!("❌ **Invalid time format**\n{}", Self::usage(ctx)),
            )
        })?;
        let text = ctx.args[1..].join(" ");

        let now = self.clock.now();
        let due_at = now + delay;
        let id = self
            .reminders
            .insert(ctx.sender_id, ctx.chat_id, due_at, text.clone(), now)
            .await?;

        info!(
            "Reminder {} set for user {} in {}min",
            id,
            ctx.sender_id,
            delay.num_minutes()
        );

        let reply = format!(
            "⏰ **Reminder Set!**\n\n\
             📝 **Message:** {}\n\
             ⏱️ **Time:** {} minutes from now\n\
             🕐 **Will remind at:** {}",
            text,
            delay.num_minutes(),
            due_at.format("%H:%M:%S UTC")
        );

        Ok(CommandOutput::new(reply, "Reminder set").with_data(serde_json::json!({
            "id": id,
            "due_at": due_at,
        })))
    }
}
