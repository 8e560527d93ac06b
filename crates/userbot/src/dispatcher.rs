//! Command parsing, routing and guarded execution.

use crate::commands::{CommandContext, CommandOutput, CommandRegistry};
use crate::error::{CommandError, ErrorKind};
use chat_transport::{Event, PeerId, SendOptions, Transport};
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Reply sent for any failure the user cannot fix themselves.
pub const GENERIC_ERROR_REPLY: &str =
    "❌ **Command Error**\n\nAn unexpected error occurred. Please try again later.";

/// Reply sent when the sender may not run a command.
pub const ACCESS_DENIED_REPLY: &str = "⛔ **Access Denied**";

/// A prefixed message split into a command name and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Lower-cased.
    pub name: String,
    /// Verbatim, whitespace-separated.
    pub args: Vec<String>,
}

/// Split `text` into a command invocation.
///
/// Returns `None` when `text` does not start with `prefix` or holds nothing
/// but the prefix.
pub fn parse_invocation(text: &str, prefix: char) -> Option<CommandInvocation> {
    let body = text.trim_start().strip_prefix(prefix)?;
    let mut tokens = body.split_whitespace();
    let name = tokens.next()?.to_lowercase();
    Some(CommandInvocation {
        name,
        args: tokens.map(str::to_string).collect(),
    })
}

/// Outcome of one dispatched command. Logged, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    pub command: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    pub duration_ms: u64,
    pub sender_id: PeerId,
    pub chat_id: PeerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResult {
    fn new(command: &str, event: &Event, duration: Duration) -> Self {
        Self {
            command: command.to_string(),
            success: false,
            message: None,
            error: None,
            duration_ms: duration.as_millis() as u64,
            sender_id: event.sender_id,
            chat_id: event.chat_id,
            data: None,
        }
    }

    fn succeeded(mut self, output: &CommandOutput) -> Self {
        self.success = true;
        self.message = Some(output.summary.clone());
        self.data = output.data.clone();
        self
    }

    fn failed(mut self, kind: ErrorKind, message: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(kind);
        self.message = Some(message.into());
        self
    }
}

/// Routes parsed invocations to registered handlers.
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    transport: Arc<dyn Transport>,
    timeout: Duration,
    prefix: char,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        transport: Arc<dyn Transport>,
        timeout: Duration,
        prefix: char,
    ) -> Self {
        Self {
            registry,
            transport,
            timeout,
            prefix,
        }
    }

    pub fn prefix(&self) -> char {
        self.prefix
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Run one invocation to completion. Never fails: every error is folded
    /// into the returned result and logged here.
    pub async fn dispatch(&self, event: &Event, invocation: CommandInvocation) -> CommandResult {
        let result = self.execute(event, invocation).await;
        log_result(&result);
        result
    }

    async fn execute(&self, event: &Event, invocation: CommandInvocation) -> CommandResult {
        let CommandInvocation { name, args } = invocation;

        let Some(command) = self.registry.lookup(&name) else {
            return self.unknown(event, &name).await;
        };

        let ctx = CommandContext {
            transport: self.transport.clone(),
            event: event.clone(),
            sender_id: event.sender_id,
            chat_id: event.chat_id,
            command: name.clone(),
            args,
            prefix: self.prefix,
        };

        let started = Instant::now();
        let outcome = tokio::time::timeout(
            self.timeout,
            AssertUnwindSafe(command.handler.execute(&ctx)).catch_unwind(),
        )
        .await;
        let result = CommandResult::new(&name, event, started.elapsed());

        match outcome {
            Ok(Ok(Ok(output))) => {
                let options = SendOptions {
                    parse_mode: output.parse_mode,
                    reply_to: Some(event.message_id),
                };
                match self.transport.send(event.chat_id, &output.reply, &options).await {
                    Ok(()) => result.succeeded(&output),
                    Err(e) => result.failed(ErrorKind::DeliveryFailed, e.to_string()),
                }
            }
            Ok(Ok(Err(CommandError::InvalidArguments { reason, hint }))) => {
                self.reply(event, &hint).await;
                result.failed(ErrorKind::InvalidArguments, reason)
            }
            Ok(Ok(Err(CommandError::PermissionDenied))) => {
                warn!("Sender {} denied {}", event.sender_id, name);
                self.reply(event, ACCESS_DENIED_REPLY).await;
                result.failed(ErrorKind::PermissionDenied, "sender not allowed")
            }
            Ok(Ok(Err(e))) => {
                error!("Command {} failed: {}", name, e);
                self.reply(event, GENERIC_ERROR_REPLY).await;
                result.failed(e.kind(), e.to_string())
            }
            Ok(Err(panic)) => {
                error!("Command {} panicked: {}", name, panic_message(&*panic));
                self.reply(event, GENERIC_ERROR_REPLY).await;
                result.failed(ErrorKind::ExecutionFailed, "handler panicked")
            }
            Err(_) => {
                warn!("Command {} timed out after {:?}", name, self.timeout);
                self.reply(event, GENERIC_ERROR_REPLY).await;
                result.failed(
                    ErrorKind::Timeout,
                    format!("no result within {:?}", self.timeout),
                )
            }
        }
    }

    async fn unknown(&self, event: &Event, name: &str) -> CommandResult {
        let started = Instant::now();
        let reply = format!(
            "❓ Unknown command. Use `{}help` for available commands.",
            self.prefix
        );
        self.reply(event, &reply).await;
        CommandResult::new(name, event, started.elapsed())
            .failed(ErrorKind::UnknownCommand, format!("unknown command: {}", name))
    }

    /// Best-effort reply on an already failed path.
    async fn reply(&self, event: &Event, text: &str) {
        let options = SendOptions::reply(event.message_id);
        if let Err(e) = self.transport.send(event.chat_id, text, &options).await {
            warn!("Failed to send error reply to {}: {}", event.chat_id, e);
        }
    }
}

fn panic_message<'a>(panic: &'a (dyn Any + Send + 'static)) -> &'a str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

fn log_result(result: &CommandResult) {
    if result.success {
        info!(
            command = %result.command,
            duration_ms = result.duration_ms,
            sender = result.sender_id,
            "Command succeeded"
        );
    } else {
        warn!(
            command = %result.command,
            duration_ms = result.duration_ms,
            sender = result.sender_id,
            error = result.error.map(|k| k.as_str()).unwrap_or("unknown"),
            "Command failed: {}",
            result.message.as_deref().unwrap_or("")
        );
    }
}
