//! Process-scoped agent state: rule tables, reminders and user activity.
//!
//! Every store is cheap to clone and synchronises internally, so the
//! event pipeline and the reminder scheduler can share them freely.
//! Nothing is persisted across restarts.

mod activity;
mod clock;
mod error;
mod reminders;
mod rules;
mod types;

pub use activity::ActivityTable;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::StateError;
pub use reminders::ReminderStore;
pub use rules::RuleStore;
pub use types::*;
