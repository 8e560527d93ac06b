//! Command name to handler mapping, built once at startup.

use super::*;
use crate::error::{AppError, AppResult};
use agent_state::{ActivityTable, Clock, ReminderStore, RuleStore};
use chat_transport::PeerId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Shared state handed to the built-in handlers.
#[derive(Clone)]
pub struct Services {
    pub rules: RuleStore,
    pub reminders: ReminderStore,
    pub activity: ActivityTable,
    pub clock: Arc<dyn Clock>,
    pub started_at: DateTime<Utc>,
    /// Senders allowed to broadcast. Empty allows everyone.
    pub broadcast_allowlist: Vec<PeerId>,
}

/// Usage metadata for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub description: String,
}

impl CommandSpec {
    pub fn new(name: &str, usage: &str, description: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            aliases: Vec::new(),
            usage: usage.to_string(),
            description: description.to_string(),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_lowercase()).collect();
        self
    }

    fn for_kind(kind: CommandKind) -> Self {
        Self::new(kind.name(), kind.usage(), kind.description()).with_aliases(kind.aliases())
    }
}

pub struct RegisteredCommand {
    pub spec: CommandSpec,
    pub handler: Arc<dyn CommandHandler>,
}

/// Exact-match, lower-case lookup table.
pub struct CommandRegistry {
    by_name: HashMap<String, Arc<RegisteredCommand>>,
    ordered: Vec<Arc<RegisteredCommand>>,
}

impl CommandRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry holding every built-in command.
    pub fn standard(services: &Services) -> AppResult<Self> {
        let specs: Vec<CommandSpec> = CommandKind::ALL
            .iter()
            .map(|kind| CommandSpec::for_kind(*kind))
            .collect();

        CommandKind::ALL
            .iter()
            .fold(Self::builder(), |builder, kind| {
                builder.register(
                    CommandSpec::for_kind(*kind),
                    handler_for(*kind, services, &specs),
                )
            })
            .build()
    }

    /// Find a command by name or alias. `name` must already be lower-case.
    pub fn lookup(&self, name: &str) -> Option<Arc<RegisteredCommand>> {
        self.by_name.get(name).cloned()
    }

    /// Registered commands in registration order.
    pub fn specs(&self) -> impl Iterator<Item = &CommandSpec> {
        self.ordered.iter().map(|c| &c.spec)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

fn handler_for(
    kind: CommandKind,
    services: &Services,
    specs: &[CommandSpec],
) -> Arc<dyn CommandHandler> {
    match kind {
        CommandKind::Ping => Arc::new(PingHandler::new()),
        CommandKind::Speed => Arc::new(SpeedHandler::new()),
        CommandKind::Status => Arc::new(StatusHandler::new(
            services.clock.clone(),
            services.started_at,
            services.reminders.clone(),
        )),
        CommandKind::Echo => Arc::new(EchoHandler::new()),
        CommandKind::Help => Arc::new(HelpHandler::new(specs.to_vec())),
        CommandKind::Reminder => Arc::new(ReminderHandler::new(
            services.reminders.clone(),
            services.clock.clone(),
        )),
        CommandKind::Stats => Arc::new(StatsHandler::new(
            services.activity.clone(),
            services.clock.clone(),
        )),
        CommandKind::AutoReply => Arc::new(AutoReplyHandler::new(services.rules.clone())),
        CommandKind::AddAutoReply => Arc::new(AddAutoReplyHandler::new(services.rules.clone())),
        CommandKind::AntiSpam => Arc::new(AntiSpamHandler::new(services.rules.clone())),
        CommandKind::AddFilter => Arc::new(AddFilterHandler::new(services.rules.clone())),
        CommandKind::Calc => Arc::new(CalcHandler::new()),
        CommandKind::Dice => Arc::new(DiceHandler::new()),
        CommandKind::Joke => Arc::new(JokeHandler::new()),
        CommandKind::Quote => Arc::new(QuoteHandler::new()),
        CommandKind::Love => Arc::new(LoveHandler::new()),
        CommandKind::Quiz => Arc::new(QuizHandler::new()),
        CommandKind::Broadcast => Arc::new(BroadcastHandler::new(
            services.broadcast_allowlist.clone(),
        )),
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    commands: Vec<RegisteredCommand>,
}

impl RegistryBuilder {
    pub fn register(mut self, spec: CommandSpec, handler: Arc<dyn CommandHandler>) -> Self {
        self.commands.push(RegisteredCommand { spec, handler });
        self
    }

    /// Fails if two commands claim the same name or alias.
    pub fn build(self) -> AppResult<CommandRegistry> {
        let mut by_name = HashMap::new();
        let mut ordered = Vec::with_capacity(self.commands.len());

        for command in self.commands {
            let command = Arc::new(command);
            let names = std::iter::once(&command.spec.name).chain(command.spec.aliases.iter());
            for name in names {
                if by_name.insert(name.clone(), command.clone()).is_some() {
                    return Err(AppError::DuplicateCommand(name.clone()));
                }
            }
            ordered.push(command);
        }

        Ok(CommandRegistry { by_name, ordered })
    }
}
