//! Status command - uptime and pending work.

use crate::commands::{CommandContext, CommandHandler, CommandOutput};
use crate::error::CommandOutcome;
use agent_state::{Clock, ReminderStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct StatusHandler {
    clock: Arc<dyn Clock>,
    started_at: DateTime<Utc>,
    reminders: ReminderStore,
}

impl StatusHandler {
    pub fn new(clock: Arc<dyn Clock>, started_at: DateTime<Utc>, reminders: ReminderStore) -> Self {
        Self {
            clock,
            started_at,
            reminders,
        }
    }
}

/// `1h 2m 3s`, dropping leading zero units.
pub(crate) fn format_uptime(secs: i64) -> String {
    let secs = secs.max(0);
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[async_trait]
impl CommandHandler for StatusHandler {
    async fn execute(&self, _ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        let uptime = (self.clock.now() - self.started_at).num_seconds();
        let pending = self.reminders.len().await;

        let reply = format!(
            "🤖 **Bot Status**\n\n\
             ✅ **Online:** Yes\n\
             ⏰ **Uptime:** {}\n\
             ⏳ **Pending reminders:** {}\n\
             🛡️ **Security:** Enabled",
            format_uptime(uptime),
            pending
        );

        Ok(CommandOutput::new(reply, "Status information sent")
            .with_data(serde_json::json!({ "uptime_secs": uptime, "pending_reminders": pending })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(5), "5s");
        assert_eq!(format_uptime(65), "1m 5s");
        assert_eq!(format_uptime(3725), "1h 2m 5s");
        assert_eq!(format_uptime(-3), "0s");
    }
}
