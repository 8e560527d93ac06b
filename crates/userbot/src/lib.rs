//! Chat userbot: event classification, command dispatch and reminders.
//!
//! Inbound events flow through [`lanes::ChatLanes`] (one ordered queue per
//! chat) into [`handler::EventHandler`], which updates activity, applies the
//! auto-reply and spam rules, and hands prefixed text to
//! [`dispatcher::Dispatcher`]. The [`scheduler::ReminderScheduler`] runs on
//! its own and only touches the reminder store and the outbound transport.

pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod health;
pub mod lanes;
pub mod scheduler;

pub use dispatcher::{parse_invocation, CommandInvocation, CommandResult, Dispatcher};
pub use error::{AppError, AppResult, CommandError, ErrorKind};
pub use handler::{EventHandler, EventOutcome};
pub use lanes::ChatLanes;
pub use scheduler::{spawn_scheduler, ReminderScheduler, ScanReport};
