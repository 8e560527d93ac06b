//! Bot command handlers.

mod autoreply;
mod broadcast;
mod calc;
mod echo;
mod fun;
mod help;
mod ping;
mod registry;
mod reminder;
mod spamfilter;
mod speed;
mod stats;
mod status;

pub use autoreply::{AddAutoReplyHandler, AutoReplyHandler};
pub use broadcast::BroadcastHandler;
pub use calc::CalcHandler;
pub use echo::EchoHandler;
pub use fun::{DiceHandler, JokeHandler, LoveHandler, QuizHandler, QuoteHandler};
pub use help::HelpHandler;
pub use ping::PingHandler;
pub use registry::{CommandRegistry, CommandSpec, RegisteredCommand, RegistryBuilder, Services};
pub use reminder::{parse_delay, ReminderHandler};
pub use spamfilter::{AddFilterHandler, AntiSpamHandler};
pub use speed::{performance, SpeedHandler};
pub use stats::StatsHandler;
pub use status::StatusHandler;

use crate::error::CommandOutcome;
use async_trait::async_trait;
use chat_transport::{Event, ParseMode, PeerId, Transport};
use std::sync::Arc;

/// Everything a handler may look at while running one invocation.
#[derive(Clone)]
pub struct CommandContext {
    pub transport: Arc<dyn Transport>,
    pub event: Event,
    pub sender_id: PeerId,
    pub chat_id: PeerId,
    /// Lower-cased command name as typed (may be an alias).
    pub command: String,
    pub args: Vec<String>,
    pub prefix: char,
}

impl CommandContext {
    /// Arguments joined back with single spaces.
    pub fn rest(&self) -> String {
        self.args.join(" ")
    }

    /// `usage` rendered with the configured prefix.
    pub fn usage(&self, usage: &str) -> String {
        format!("❌ **Usage:** `{}{}`", self.prefix, usage)
    }
}

/// Successful handler output. The dispatcher delivers `reply`.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub reply: String,
    pub parse_mode: ParseMode,
    /// Short summary for the command result log.
    pub summary: String,
    pub data: Option<serde_json::Value>,
}

impl CommandOutput {
    pub fn new(reply: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            parse_mode: ParseMode::Markdown,
            summary: summary.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Command handler trait.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Execute the command.
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput>;
}

/// Every built-in command. The registry resolves each kind to its handler
/// with an exhaustive match, so a kind without a handler does not compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Ping,
    Speed,
    Status,
    Echo,
    Help,
    Reminder,
    Stats,
    AutoReply,
    AddAutoReply,
    AntiSpam,
    AddFilter,
    Calc,
    Dice,
    Joke,
    Quote,
    Love,
    Quiz,
    Broadcast,
}

impl CommandKind {
    pub const ALL: [CommandKind; 18] = [
        Self::Ping,
        Self::Speed,
        Self::Status,
        Self::Echo,
        Self::Help,
        Self::Reminder,
        Self::Stats,
        Self::AutoReply,
        Self::AddAutoReply,
        Self::AntiSpam,
        Self::AddFilter,
        Self::Calc,
        Self::Dice,
        Self::Joke,
        Self::Quote,
        Self::Love,
        Self::Quiz,
        Self::Broadcast,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Speed => "speed",
            Self::Status => "status",
            Self::Echo => "echo",
            Self::Help => "help",
            Self::Reminder => "reminder",
            Self::Stats => "stats",
            Self::AutoReply => "autoreply",
            Self::AddAutoReply => "addar",
            Self::AntiSpam => "antispam",
            Self::AddFilter => "addfilter",
            Self::Calc => "calc",
            Self::Dice => "dice",
            Self::Joke => "joke",
            Self::Quote => "quote",
            Self::Love => "love",
            Self::Quiz => "quiz",
            Self::Broadcast => "broadcast",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Help => &["commands"],
            Self::Reminder => &["remind"],
            Self::Dice => &["roll"],
            _ => &[],
        }
    }

    /// Usage line without the prefix.
    pub fn usage(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Speed => "speed",
            Self::Status => "status",
            Self::Echo => "echo <text>",
            Self::Help => "help",
            Self::Reminder => "reminder <time> <message>",
            Self::Stats => "stats",
            Self::AutoReply => "autoreply on|off|list",
            Self::AddAutoReply => "addar <word> <reply>",
            Self::AntiSpam => "antispam on|off|list",
            Self::AddFilter => "addfilter <word>",
            Self::Calc => "calc <expression>",
            Self::Dice => "dice",
            Self::Joke => "joke",
            Self::Quote => "quote",
            Self::Love => "love [name]",
            Self::Quiz => "quiz",
            Self::Broadcast => "broadcast <message>",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Ping => "Test response",
            Self::Speed => "Measure send latency",
            Self::Status => "Bot status",
            Self::Echo => "Echo message",
            Self::Help => "Show this help",
            Self::Reminder => "Remind you later (5m, 1h, 2d)",
            Self::Stats => "Your message statistics",
            Self::AutoReply => "Manage auto-replies",
            Self::AddAutoReply => "Add an auto-reply trigger",
            Self::AntiSpam => "Manage spam detection",
            Self::AddFilter => "Add a spam keyword",
            Self::Calc => "Evaluate a math expression",
            Self::Dice => "Roll a die",
            Self::Joke => "Random joke",
            Self::Quote => "Inspirational quote",
            Self::Love => "Love calculator",
            Self::Quiz => "Quick quiz question",
            Self::Broadcast => "Broadcast a message (allowlisted users)",
        }
    }
}
